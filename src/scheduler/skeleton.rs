//! Weekly timetable skeleton.
//!
//! Lays the day's class intervals (breaks excluded) over every working day,
//! keyed `Period 1..n`, for sections and venues alike.

use crate::config::TimetableParams;
use crate::error::TimetableError;
use crate::models::{
    Day, Period, PeriodKey, Section, SectionTimetable, TimeSlot, Venue, VenuePeriod,
    VenueTimetable,
};
use crate::slots::class_slots;
use crate::validation::{ValidationError, ValidationErrorKind};

/// Days and class intervals shared by every timetable of an institute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    days: Vec<Day>,
    slots: Vec<TimeSlot>,
}

impl Skeleton {
    /// Builds the skeleton for the run parameters.
    pub fn new(params: &TimetableParams) -> Result<Self, TimetableError> {
        Self::from_parts(params.days(), class_slots(&params.slot_params()))
    }

    /// Builds a skeleton from explicit days and class intervals.
    ///
    /// Fails when a day has more periods than a [`PeriodKey`] can number.
    pub fn from_parts(days: Vec<Day>, slots: Vec<TimeSlot>) -> Result<Self, TimetableError> {
        if u16::try_from(slots.len()).is_err() {
            return Err(TimetableError::from(vec![ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("{} periods per day exceeds {}", slots.len(), u16::MAX),
            )]));
        }
        Ok(Self { days, slots })
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Class periods per day.
    pub fn periods_per_day(&self) -> usize {
        self.slots.len()
    }

    fn keyed(&self) -> impl Iterator<Item = (PeriodKey, TimeSlot)> + '_ {
        (1..=u16::MAX)
            .zip(&self.slots)
            .map(|(n, &slot)| (PeriodKey(n), slot))
    }

    /// A section timetable with every period empty.
    pub fn section_timetable(&self) -> SectionTimetable {
        let mut timetable = SectionTimetable::new();
        for &day in &self.days {
            for (key, slot) in self.keyed() {
                timetable.insert(day, key, Period::empty(slot));
            }
        }
        timetable
    }

    /// A venue timetable with no bookings.
    pub fn venue_timetable(&self) -> VenueTimetable {
        let mut timetable = VenueTimetable::new();
        for &day in &self.days {
            for (key, slot) in self.keyed() {
                timetable.insert(day, key, VenuePeriod::open(slot));
            }
        }
        timetable
    }

    /// Resets every section and venue timetable to the skeleton.
    pub fn apply(&self, sections: &mut [Section], venues: &mut [Venue]) {
        let section_template = self.section_timetable();
        for section in sections.iter_mut() {
            section.timetable = section_template.clone();
        }
        let venue_template = self.venue_timetable();
        for venue in venues.iter_mut() {
            venue.timetable = venue_template.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_hhmm, PeriodKind};

    fn params(days: u8) -> TimetableParams {
        TimetableParams::new("iiit", parse_hhmm("09:00").unwrap(), parse_hhmm("13:00").unwrap())
            .with_period_minutes(50)
            .with_breaks(2, 10)
            .with_working_days(days)
    }

    #[test]
    fn test_skeleton_shape() {
        let sk = Skeleton::new(&params(5)).unwrap();
        assert_eq!(sk.days().len(), 5);
        assert_eq!(sk.periods_per_day(), 4);

        let tt = sk.section_timetable();
        assert_eq!(tt.period_count(), 20);
        assert_eq!(
            tt.get(Day::Friday, PeriodKey(4)).map(|p| p.slot.to_string()),
            Some("11:50-12:40".to_string())
        );
        assert!(tt.get(Day::Saturday, PeriodKey(1)).is_none());
    }

    #[test]
    fn test_six_day_week() {
        let sk = Skeleton::new(&params(6)).unwrap();
        assert_eq!(sk.venue_timetable().days().last(), Some(Day::Saturday));
    }

    #[test]
    fn test_apply_resets_content() {
        let sk = Skeleton::new(&params(5)).unwrap();
        let mut sections = vec![Section::new("A", 40).with_home_venue("R1")];
        let mut venues = vec![Venue::classroom("R1", 60)];
        sk.apply(&mut sections, &mut venues);

        if let Some(p) = sections[0].timetable.get_mut(Day::Monday, PeriodKey(1)) {
            p.kind = PeriodKind::Lunch;
        }
        sk.apply(&mut sections, &mut venues);

        assert_eq!(sections[0].timetable.count(Period::is_empty), 20);
        assert_eq!(sections[0].home_venue.as_deref(), Some("R1"));
        assert!(venues[0].timetable.iter().all(|(_, _, p)| p.is_free()));
    }

    #[test]
    fn test_too_many_periods_rejected() {
        let slot = TimeSlot::parse("09:00", "09:01").unwrap();
        let slots = vec![slot; usize::from(u16::MAX) + 1];
        let err = Skeleton::from_parts(vec![Day::Monday], slots).unwrap_err();
        assert!(matches!(err, TimetableError::Validation(_)));

        let sk = Skeleton::from_parts(vec![Day::Monday], vec![slot; 3]).unwrap();
        let keys: Vec<PeriodKey> = sk
            .section_timetable()
            .day(Day::Monday)
            .unwrap()
            .keys()
            .copied()
            .collect();
        assert_eq!(keys, vec![PeriodKey(1), PeriodKey(2), PeriodKey(3)]);
    }
}
