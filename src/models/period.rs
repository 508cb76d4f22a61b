//! Time slot and period models.
//!
//! A period is one interval of a section's (or venue's) day. Section
//! periods carry a tagged [`PeriodKind`]; venue periods carry the set of
//! section bookings sharing the room at that time.
//!
//! # Time Model
//! Clock times are `chrono::NaiveTime`, stored and displayed as `HH:MM`.
//! Intervals are half-open: `[start, end)`.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A clock interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Interval start (inclusive).
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    /// Interval end (exclusive).
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parses a slot from two `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self::new(parse_hhmm(start)?, parse_hhmm(end)?))
    }

    /// Length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_minutes()
    }

    /// Whether a time falls within this slot.
    #[inline]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two slots overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Parses an `HH:MM` clock time.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
}

/// Adds minutes to a clock time. `None` if the result would pass midnight.
pub fn add_minutes(time: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let (next, wrapped) = time.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    (wrapped == 0).then_some(next)
}

/// Subtracts minutes from a clock time. `None` if the result would precede midnight.
pub fn sub_minutes(time: NaiveTime, minutes: u32) -> Option<NaiveTime> {
    let (prev, wrapped) = time.overflowing_sub_signed(Duration::minutes(i64::from(minutes)));
    (wrapped == 0).then_some(prev)
}

/// Serde adapter storing `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hhmm(&s).map_err(serde::de::Error::custom)
    }
}

/// What occupies a section period.
///
/// Serialized with a `type` tag: `nill`, `Lunch`, `Elective`, `regular`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PeriodKind {
    /// Free slot.
    #[default]
    #[serde(rename = "nill")]
    Empty,
    /// Lunch break.
    Lunch,
    /// Reserved for the cross-section elective block.
    Elective,
    /// A regular subject taught in a venue.
    #[serde(rename = "regular")]
    Regular {
        /// Subject code.
        subject: String,
        /// Venue ID.
        venue: String,
        /// Faculty ID, when the subject has an allocation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        faculty: Option<String>,
    },
}

/// One period in a section's timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Clock interval.
    #[serde(flatten)]
    pub slot: TimeSlot,
    /// Occupancy.
    #[serde(flatten)]
    pub kind: PeriodKind,
}

impl Period {
    /// Creates a free period.
    pub fn empty(slot: TimeSlot) -> Self {
        Self {
            slot,
            kind: PeriodKind::Empty,
        }
    }

    /// Whether the period is free.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kind == PeriodKind::Empty
    }

    /// Whether the period is the lunch break.
    #[inline]
    pub fn is_lunch(&self) -> bool {
        self.kind == PeriodKind::Lunch
    }

    /// Whether the period is reserved for electives.
    #[inline]
    pub fn is_elective(&self) -> bool {
        self.kind == PeriodKind::Elective
    }

    /// Subject code of a regular period.
    pub fn subject(&self) -> Option<&str> {
        match &self.kind {
            PeriodKind::Regular { subject, .. } => Some(subject),
            _ => None,
        }
    }

    /// Venue ID of a regular period.
    pub fn venue(&self) -> Option<&str> {
        match &self.kind {
            PeriodKind::Regular { venue, .. } => Some(venue),
            _ => None,
        }
    }

    /// Faculty ID of a regular period.
    pub fn faculty(&self) -> Option<&str> {
        match &self.kind {
            PeriodKind::Regular { faculty, .. } => faculty.as_deref(),
            _ => None,
        }
    }
}

/// A section's claim on a venue period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking section ID.
    pub section: String,
    /// Subject code.
    pub subject: String,
    /// Faculty ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    /// Faculty display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_name: Option<String>,
}

/// One period in a venue's timetable.
///
/// Several sections may book the same venue period (a merged lecture);
/// bookings are keyed by section ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenuePeriod {
    /// Clock interval.
    #[serde(flatten)]
    pub slot: TimeSlot,
    /// Section ID → booking.
    #[serde(default)]
    pub bookings: BTreeMap<String, Booking>,
}

impl VenuePeriod {
    /// Creates a venue period with no bookings.
    pub fn open(slot: TimeSlot) -> Self {
        Self {
            slot,
            bookings: BTreeMap::new(),
        }
    }

    /// Whether nobody has booked this period.
    pub fn is_free(&self) -> bool {
        self.bookings.is_empty()
    }
}
