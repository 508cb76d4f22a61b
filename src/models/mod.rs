//! Timetabling domain models.
//!
//! Provides the core data types for an institute's weekly timetable:
//! who teaches (faculty), what is taught (subjects), to whom (sections),
//! where (venues), and when (periods within a day).
//!
//! # Domain Mappings
//!
//! | u-timetable | Scheduling term | Notes |
//! |-------------|-----------------|-------|
//! | Section | Job | Needs every subject placed |
//! | Subject | Operation | Credits = periods per week |
//! | Faculty | Human resource | Load-limited |
//! | Venue | Primary resource | Capacity in seats |
//! | Period | Time slot | `[start, end)` on one day |

mod faculty;
mod period;
mod section;
mod subject;
mod timetable;
mod venue;

pub use faculty::{Capability, Faculty, TeachingType};
pub use period::{
    add_minutes, hhmm, parse_hhmm, sub_minutes, Booking, Period, PeriodKind, TimeSlot, VenuePeriod,
};
pub use section::{Allocation, Allocations, Section};
pub use subject::{normalize_subject_name, Subject};
pub use timetable::{Day, DayPeriods, PeriodKey, SectionTimetable, Timetable, VenueTimetable};
pub use venue::{Venue, VenueKind};
