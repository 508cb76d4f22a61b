//! Clash detection over section timetables.

use std::collections::{BTreeMap, BTreeSet};

use super::{Clash, ClashKind};
use crate::models::{Day, PeriodKey, PeriodKind, Section, TimeSlot, Venue};

/// (day, interval) of an occupied period.
pub(crate) type TimeKey = (Day, TimeSlot);

/// One section sitting in one venue at one time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    /// Index into the sections slice.
    pub index: usize,
    pub section: String,
    pub key: PeriodKey,
    pub strength: u32,
    pub venue: String,
    pub faculty: Option<String>,
    pub subject: String,
}

impl Entry {
    fn same_group(&self, other: &Entry) -> bool {
        self.faculty.is_some() && self.faculty == other.faculty && self.subject == other.subject
    }
}

/// A clash plus the occupants that would move to fix it.
#[derive(Debug, Clone)]
pub(crate) struct Finding {
    pub clash: Clash,
    /// Groups of entries that move together. For a double booking the
    /// first unit keeps the venue.
    pub units: Vec<Vec<Entry>>,
}

/// Who occupies which venue when.
#[derive(Debug, Default)]
pub(crate) struct Occupancy {
    /// time → venue → occupants
    pub cells: BTreeMap<TimeKey, BTreeMap<String, Vec<Entry>>>,
    /// (time, faculty, subject) → members
    pub merge_groups: BTreeMap<(TimeKey, String, String), Vec<Entry>>,
}

impl Occupancy {
    /// Indexes every Regular period of every section.
    pub fn build(sections: &[Section]) -> Self {
        let mut occupancy = Self::default();
        for (index, section) in sections.iter().enumerate() {
            for (day, key, period) in section.timetable.iter() {
                let PeriodKind::Regular {
                    subject,
                    venue,
                    faculty,
                } = &period.kind
                else {
                    continue;
                };
                let time = (day, period.slot);
                let entry = Entry {
                    index,
                    section: section.id.clone(),
                    key,
                    strength: section.strength,
                    venue: venue.clone(),
                    faculty: faculty.clone(),
                    subject: subject.clone(),
                };
                if let Some(f) = faculty {
                    occupancy
                        .merge_groups
                        .entry((time, f.clone(), subject.clone()))
                        .or_default()
                        .push(entry.clone());
                }
                occupancy
                    .cells
                    .entry(time)
                    .or_default()
                    .entry(venue.clone())
                    .or_default()
                    .push(entry);
            }
        }
        occupancy
    }

    /// Venues in use at every time.
    pub fn used(&self) -> BTreeMap<TimeKey, BTreeSet<String>> {
        self.cells
            .iter()
            .map(|(&time, venues)| (time, venues.keys().cloned().collect()))
            .collect()
    }
}

/// Finds capacity and double-booking clashes.
#[derive(Debug, Clone)]
pub struct ClashDetector {
    capacities: BTreeMap<String, u32>,
    /// Classrooms as (capacity, id), smallest first.
    classrooms: Vec<(u32, String)>,
}

impl ClashDetector {
    /// Creates a detector for the given venues.
    pub fn new(venues: &[Venue]) -> Self {
        let capacities = venues.iter().map(|v| (v.id.clone(), v.capacity)).collect();
        let mut classrooms: Vec<(u32, String)> = venues
            .iter()
            .filter(|v| v.is_classroom())
            .map(|v| (v.capacity, v.id.clone()))
            .collect();
        classrooms.sort();
        Self {
            capacities,
            classrooms,
        }
    }

    /// Capacity of a venue. Unknown venues seat nobody.
    pub fn capacity(&self, venue: &str) -> u32 {
        self.capacities.get(venue).copied().unwrap_or(0)
    }

    /// Every clash in the sections' current timetables.
    pub fn detect(&self, sections: &[Section]) -> Vec<Clash> {
        let occupancy = Occupancy::build(sections);
        self.capacity_findings(&occupancy)
            .into_iter()
            .chain(self.double_bookings(&occupancy))
            .map(|f| f.clash)
            .collect()
    }

    /// Merge groups sharing one venue whose combined strength exceeds it.
    pub(crate) fn capacity_findings(&self, occupancy: &Occupancy) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (((day, slot), faculty, subject), group) in &occupancy.merge_groups {
            if group.len() < 2 {
                continue;
            }
            let venue = &group[0].venue;
            if group.iter().any(|e| &e.venue != venue) {
                continue;
            }
            let combined: u32 = group.iter().map(|e| e.strength).sum();
            let capacity = self.capacity(venue);
            if combined <= capacity {
                continue;
            }
            findings.push(Finding {
                clash: Clash {
                    kind: ClashKind::Capacity { combined, capacity },
                    day: *day,
                    slot: *slot,
                    venue: venue.clone(),
                    sections: group.iter().map(|e| e.section.clone()).collect(),
                    faculty: Some(faculty.clone()),
                    subject: Some(subject.clone()),
                },
                units: vec![group.clone()],
            });
        }
        findings
    }

    /// Venues holding more than one independent occupant.
    pub(crate) fn double_bookings(&self, occupancy: &Occupancy) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (&(day, slot), venues) in &occupancy.cells {
            for (venue, entries) in venues {
                let mut units: Vec<Vec<Entry>> = Vec::new();
                for entry in entries {
                    match units.iter_mut().find(|u| u[0].same_group(entry)) {
                        Some(unit) => unit.push(entry.clone()),
                        None => units.push(vec![entry.clone()]),
                    }
                }
                if units.len() < 2 {
                    continue;
                }
                findings.push(Finding {
                    clash: Clash {
                        kind: ClashKind::DoubleBooking,
                        day,
                        slot,
                        venue: venue.clone(),
                        sections: entries.iter().map(|e| e.section.clone()).collect(),
                        faculty: None,
                        subject: None,
                    },
                    units,
                });
            }
        }
        findings
    }

    /// Smallest free classroom seating `required`, ties by ID.
    pub(crate) fn alternate(
        &self,
        required: u32,
        in_use: Option<&BTreeSet<String>>,
    ) -> Option<&str> {
        self.classrooms
            .iter()
            .filter(|(capacity, _)| *capacity >= required)
            .find(|(_, id)| !in_use.is_some_and(|used| used.contains(id)))
            .map(|(_, id)| id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clash::fixtures::seat;

    #[test]
    fn test_merge_group_over_capacity() {
        let mut venues = vec![Venue::classroom("R40", 40)];
        let mut a = Section::new("A", 30);
        let mut b = Section::new("B", 30);
        seat(&mut a, &mut venues, "R40", "CS1", Some("F1"));
        seat(&mut b, &mut venues, "R40", "CS1", Some("F1"));

        let clashes = ClashDetector::new(&venues).detect(&[a, b]);

        assert_eq!(clashes.len(), 1);
        assert_eq!(
            clashes[0].kind,
            ClashKind::Capacity {
                combined: 60,
                capacity: 40
            }
        );
        assert_eq!(clashes[0].sections, vec!["A", "B"]);
    }

    #[test]
    fn test_merge_group_within_capacity_is_fine() {
        let mut venues = vec![Venue::classroom("R80", 80)];
        let mut a = Section::new("A", 30);
        let mut b = Section::new("B", 30);
        seat(&mut a, &mut venues, "R80", "CS1", Some("F1"));
        seat(&mut b, &mut venues, "R80", "CS1", Some("F1"));

        assert!(ClashDetector::new(&venues).detect(&[a, b]).is_empty());
    }

    #[test]
    fn test_double_booking() {
        let mut venues = vec![Venue::classroom("R80", 80)];
        let mut a = Section::new("A", 30);
        let mut b = Section::new("B", 30);
        let mut c = Section::new("C", 10);
        seat(&mut a, &mut venues, "R80", "CS1", Some("F1"));
        seat(&mut b, &mut venues, "R80", "CS2", Some("F2"));
        seat(&mut c, &mut venues, "R80", "CS3", None);

        let occupancy = Occupancy::build(&[a, b, c]);
        let findings = ClashDetector::new(&venues).double_bookings(&occupancy);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].clash.kind, ClashKind::DoubleBooking);
        assert_eq!(findings[0].units.len(), 3);
    }

    #[test]
    fn test_alternate_prefers_smallest_free_classroom() {
        let venues = vec![
            Venue::classroom("R100", 100),
            Venue::classroom("R60", 60),
            Venue::classroom("R61", 60),
            Venue::lab("L70", 70),
        ];
        let detector = ClashDetector::new(&venues);
        assert_eq!(detector.alternate(55, None), Some("R60"));

        let used: BTreeSet<String> = ["R60".to_string()].into();
        assert_eq!(detector.alternate(55, Some(&used)), Some("R61"));
        assert_eq!(detector.alternate(101, None), None);
    }
}
