//! Venue model.
//!
//! Venues are classrooms and labs with a fixed seating capacity. Each
//! venue mirrors the bookings sections make in it.

use serde::{Deserialize, Serialize};

use super::{Booking, Day, PeriodKey, TimeSlot, VenuePeriod, VenueTimetable};

/// Venue classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VenueKind {
    /// Lecture room.
    #[default]
    Classroom,
    /// Laboratory.
    Lab,
}

/// A classroom or lab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Unique venue identifier.
    pub id: String,
    /// Seats available.
    pub capacity: u32,
    /// Venue classification.
    #[serde(rename = "type")]
    pub kind: VenueKind,
    /// Bookings per day and period.
    #[serde(default)]
    pub timetable: VenueTimetable,
}

impl Venue {
    /// Creates a venue.
    pub fn new(id: impl Into<String>, capacity: u32, kind: VenueKind) -> Self {
        Self {
            id: id.into(),
            capacity,
            kind,
            timetable: VenueTimetable::new(),
        }
    }

    /// Creates a classroom.
    pub fn classroom(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, capacity, VenueKind::Classroom)
    }

    /// Creates a lab.
    pub fn lab(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, capacity, VenueKind::Lab)
    }

    /// Whether this is a classroom.
    #[inline]
    pub fn is_classroom(&self) -> bool {
        self.kind == VenueKind::Classroom
    }

    /// Whether `strength` students fit.
    #[inline]
    pub fn fits(&self, strength: u32) -> bool {
        self.capacity >= strength
    }

    /// Records a booking at (day, key), opening the period if missing.
    pub fn book(&mut self, day: Day, key: PeriodKey, slot: TimeSlot, booking: Booking) {
        match self.timetable.get_mut(day, key) {
            Some(period) => {
                period.bookings.insert(booking.section.clone(), booking);
            }
            None => {
                let mut period = VenuePeriod::open(slot);
                period.bookings.insert(booking.section.clone(), booking);
                self.timetable.insert(day, key, period);
            }
        }
    }

    /// Removes a section's booking at (day, key).
    pub fn release(&mut self, day: Day, key: PeriodKey, section: &str) -> Option<Booking> {
        self.timetable
            .get_mut(day, key)
            .and_then(|period| period.bookings.remove(section))
    }
}
