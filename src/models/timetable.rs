//! Weekly timetable model.
//!
//! A timetable maps each working [`Day`] to an ordered set of periods keyed
//! by [`PeriodKey`] (`Period 1`, `Period 2`, ...). The same shape serves
//! sections (`Timetable<Period>`) and venues (`Timetable<VenuePeriod>`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{Period, VenuePeriod};

/// A working day. Ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// All schedulable days in order.
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// The first `count` days of the week (5 = Mon-Fri, 6 = Mon-Sat).
    pub fn week(count: usize) -> Vec<Day> {
        Self::ALL.iter().copied().take(count.min(Self::ALL.len())).collect()
    }

    /// Day name.
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = String;

    /// Accepts `Monday` as well as store-style keys such as `1_Monday`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.rsplit('_').next().unwrap_or(s).trim();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown day '{s}'"))
    }
}

impl From<Day> for String {
    fn from(day: Day) -> Self {
        day.name().to_string()
    }
}

impl TryFrom<String> for Day {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// 1-based period index within a day, rendered as `Period N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PeriodKey(pub u16);

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period {}", self.0)
    }
}

impl FromStr for PeriodKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .map(PeriodKey)
            .ok_or_else(|| format!("invalid period key '{s}'"))
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Periods of one day, in key order.
pub type DayPeriods<P> = BTreeMap<PeriodKey, P>;

/// A weekly timetable: day → period key → period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable<P> {
    days: BTreeMap<Day, DayPeriods<P>>,
}

/// A section's timetable.
pub type SectionTimetable = Timetable<Period>;

/// A venue's timetable.
pub type VenueTimetable = Timetable<VenuePeriod>;

impl<P> Default for Timetable<P> {
    fn default() -> Self {
        Self {
            days: BTreeMap::new(),
        }
    }
}

impl<P> Timetable<P> {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a period.
    pub fn insert(&mut self, day: Day, key: PeriodKey, period: P) {
        self.days.entry(day).or_default().insert(key, period);
    }

    /// Replaces a whole day.
    pub fn set_day(&mut self, day: Day, periods: DayPeriods<P>) {
        self.days.insert(day, periods);
    }

    /// Periods of a day.
    pub fn day(&self, day: Day) -> Option<&DayPeriods<P>> {
        self.days.get(&day)
    }

    /// Mutable periods of a day.
    pub fn day_mut(&mut self, day: Day) -> Option<&mut DayPeriods<P>> {
        self.days.get_mut(&day)
    }

    /// A single period.
    pub fn get(&self, day: Day, key: PeriodKey) -> Option<&P> {
        self.days.get(&day).and_then(|d| d.get(&key))
    }

    /// A single period, mutably.
    pub fn get_mut(&mut self, day: Day, key: PeriodKey) -> Option<&mut P> {
        self.days.get_mut(&day).and_then(|d| d.get_mut(&key))
    }

    /// Days present, in order.
    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.days.keys().copied()
    }

    /// All periods as `(day, key, period)`, in order.
    pub fn iter(&self) -> impl Iterator<Item = (Day, PeriodKey, &P)> {
        self.days
            .iter()
            .flat_map(|(&day, periods)| periods.iter().map(move |(&key, p)| (day, key, p)))
    }

    /// Removes every day.
    pub fn clear(&mut self) {
        self.days.clear();
    }

    /// Whether no day is present.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of periods across all days.
    pub fn period_count(&self) -> usize {
        self.days.values().map(BTreeMap::len).sum()
    }
}

impl SectionTimetable {
    /// Number of periods on `day` matching `pred`.
    pub fn count_on(&self, day: Day, pred: impl Fn(&Period) -> bool) -> usize {
        self.day(day)
            .map(|periods| periods.values().filter(|p| pred(p)).count())
            .unwrap_or(0)
    }

    /// Number of periods in the week matching `pred`.
    pub fn count(&self, pred: impl Fn(&Period) -> bool) -> usize {
        self.iter().filter(|(_, _, p)| pred(p)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodKind, TimeSlot};

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::parse(start, end).unwrap()
    }

    #[test]
    fn test_week() {
        assert_eq!(Day::week(5).len(), 5);
        assert_eq!(Day::week(6).last(), Some(&Day::Saturday));
        assert_eq!(Day::week(5).last(), Some(&Day::Friday));
    }

    #[test]
    fn test_day_parsing() {
        assert_eq!("Monday".parse::<Day>(), Ok(Day::Monday));
        assert_eq!("3_Wednesday".parse::<Day>(), Ok(Day::Wednesday));
        assert_eq!("friday".parse::<Day>(), Ok(Day::Friday));
        assert!("Sunday".parse::<Day>().is_err());
    }

    #[test]
    fn test_period_key_order_is_numeric() {
        let p2: PeriodKey = "Period 2".parse().unwrap();
        let p10: PeriodKey = "Period 10".parse().unwrap();
        assert!(p2 < p10);
        assert_eq!(p2, PeriodKey(2));
        assert_eq!(p10.to_string(), "Period 10");
    }

    #[test]
    fn test_timetable_access() {
        let mut tt = SectionTimetable::new();
        tt.insert(Day::Monday, PeriodKey(1), Period::empty(slot("09:00", "09:50")));
        tt.insert(Day::Monday, PeriodKey(2), Period::empty(slot("09:50", "10:40")));
        tt.insert(Day::Tuesday, PeriodKey(1), Period::empty(slot("09:00", "09:50")));

        assert_eq!(tt.period_count(), 3);
        assert_eq!(tt.days().collect::<Vec<_>>(), vec![Day::Monday, Day::Tuesday]);

        tt.get_mut(Day::Monday, PeriodKey(2)).unwrap().kind = PeriodKind::Lunch;
        assert_eq!(tt.count_on(Day::Monday, Period::is_lunch), 1);
        assert_eq!(tt.count_on(Day::Tuesday, Period::is_lunch), 0);
        assert_eq!(tt.count(Period::is_empty), 2);
    }

    #[test]
    fn test_timetable_json_keys() {
        let mut tt = SectionTimetable::new();
        tt.insert(Day::Friday, PeriodKey(4), Period::empty(slot("12:00", "12:50")));
        let json = serde_json::to_value(&tt).unwrap();
        assert_eq!(json["Friday"]["Period 4"]["type"], "nill");

        let back: SectionTimetable = serde_json::from_value(json).unwrap();
        assert_eq!(back, tt);
    }
}
