//! Timetable placement stages.
//!
//! Each stage works on in-memory sections (and venues) and reports what it
//! could not do instead of failing:
//!
//! | Stage | Fills |
//! |-------|-------|
//! | [`Skeleton`] | empty periods from the day's class intervals |
//! | [`LunchAssigner`] | one Lunch period per section-day |
//! | [`ElectiveScheduler`] | two 2-period Elective blocks per section |
//! | [`TheoryAssigner`] | Theory subject periods, with venue bookings |
//!
//! Randomized stages take the caller's `Rng`, so a seeded generator gives
//! reproducible timetables.

mod elective;
mod lunch;
mod skeleton;
mod theory;

pub use elective::{
    ElectiveBlock, ElectiveOutcome, ElectiveScheduler, ElectiveSlot, BLOCKS_PER_WEEK,
    MAX_ELECTIVES_PER_DAY,
};
pub use lunch::{LunchAssigner, LunchOutcome};
pub use skeleton::Skeleton;
pub use theory::{
    PlacementEvent, PlacementKind, TheoryAssigner, TheoryOutcome,
    MAX_SUBJECT_PERIODS_PER_DAY,
};
