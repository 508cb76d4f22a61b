//! Non-fatal per-item failures.
//!
//! A run never rolls back because one subject, one section-day, or one clash
//! could not be handled. Each such item is recorded as an [`Unresolved`]
//! value and the stage moves on to sibling work.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clash::Clash;
use crate::models::Day;

/// An item a stage could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum Unresolved {
    /// No faculty lists the subject, or none with a compatible teaching type.
    #[error("No faculty found for '{subject}' (section {section})")]
    NoFaculty { section: String, subject: String },

    /// Every compatible faculty member is at the load limit.
    #[error("All faculty for '{subject}' are at the load limit (section {section})")]
    FacultyLoadExhausted { section: String, subject: String },

    /// The section has no free slot left for lunch that day.
    #[error("No free slot for lunch: section {section} on {day}")]
    NoLunchSlot { section: String, day: Day },

    /// Fewer than two elective days could be found for a cohort.
    #[error("No elective block for cohort {cohort} ({})", sections.join(", "))]
    NoElectiveSlots { cohort: usize, sections: Vec<String> },

    /// Credit periods left over after the attempt budget ran out.
    #[error("{remaining} period(s) of '{subject}' unplaced (section {section})")]
    CreditsUnplaced {
        section: String,
        subject: String,
        remaining: u32,
    },

    /// No classroom is large enough for the section. The subject's
    /// remaining credits are given up for that section.
    #[error("No classroom fits section {section} for '{subject}' on {day}, {remaining} period(s) unplaced")]
    NoVenue {
        section: String,
        subject: String,
        day: Day,
        remaining: u32,
    },

    /// A clash still standing after resolution.
    #[error("Unresolved clash: {0}")]
    Clash(Clash),
}

/// Failure category, for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// A subject or reference could not be matched.
    Lookup,
    /// No faculty or venue with enough headroom.
    Capacity,
    /// No free slot within the budget.
    Placement,
    /// A venue conflict left after resolution.
    Clash,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Lookup => "lookup",
            Category::Capacity => "capacity",
            Category::Placement => "placement",
            Category::Clash => "clash",
        };
        f.write_str(name)
    }
}

impl Unresolved {
    /// Category of this item.
    pub fn category(&self) -> Category {
        match self {
            Unresolved::NoFaculty { .. } => Category::Lookup,
            Unresolved::FacultyLoadExhausted { .. } | Unresolved::NoVenue { .. } => {
                Category::Capacity
            }
            Unresolved::NoLunchSlot { .. }
            | Unresolved::NoElectiveSlots { .. }
            | Unresolved::CreditsUnplaced { .. } => Category::Placement,
            Unresolved::Clash(_) => Category::Clash,
        }
    }

    /// Section the item concerns, when it concerns exactly one.
    pub fn section(&self) -> Option<&str> {
        match self {
            Unresolved::NoFaculty { section, .. }
            | Unresolved::FacultyLoadExhausted { section, .. }
            | Unresolved::NoLunchSlot { section, .. }
            | Unresolved::CreditsUnplaced { section, .. }
            | Unresolved::NoVenue { section, .. } => Some(section),
            Unresolved::NoElectiveSlots { .. } | Unresolved::Clash(_) => None,
        }
    }
}
