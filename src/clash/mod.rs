//! Clash detection and repair.
//!
//! After placement, two kinds of venue conflict can exist at one
//! (day, start, end):
//!
//! - **Capacity**: one faculty member teaches one subject to several
//!   sections in the same room (a merge group) and their combined strength
//!   exceeds the room.
//! - **Double booking**: unrelated sections, or different merge groups,
//!   sit in the same room.
//!
//! [`ClashDetector`] finds both from section timetables alone.
//! [`ClashResolver`] moves sections to free classrooms over a bounded
//! number of passes and reports whatever is left.

mod detector;
mod resolver;

pub use detector::ClashDetector;
pub use resolver::{ClashReport, ClashResolver};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{Day, TimeSlot};

/// Conflict classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClashKind {
    /// A merge group outgrows its shared venue.
    Capacity { combined: u32, capacity: u32 },
    /// Independent occupants share a venue.
    DoubleBooking,
}

/// A venue conflict at one time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clash {
    pub kind: ClashKind,
    pub day: Day,
    pub slot: TimeSlot,
    pub venue: String,
    /// Sections involved, in timetable order.
    pub sections: Vec<String>,
    /// Faculty of a capacity clash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    /// Subject of a capacity clash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Clash {
    #[inline]
    pub fn is_capacity(&self) -> bool {
        matches!(self.kind, ClashKind::Capacity { .. })
    }
}

impl fmt::Display for Clash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = self.sections.join(", ");
        match self.kind {
            ClashKind::Capacity { combined, capacity } => write!(
                f,
                "{} {} in {}: {} students > {} seats ({}; {} teaching {})",
                self.day,
                self.slot,
                self.venue,
                combined,
                capacity,
                sections,
                self.faculty.as_deref().unwrap_or("?"),
                self.subject.as_deref().unwrap_or("?"),
            ),
            ClashKind::DoubleBooking => write!(
                f,
                "{} {} in {}: double booked ({})",
                self.day, self.slot, self.venue, sections
            ),
        }
    }
}
