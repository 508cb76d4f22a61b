//! Bounded clash repair.
//!
//! # Algorithm
//!
//! Up to `max_iterations` passes. Each pass:
//! 1. Rebuild occupancy from the section timetables.
//! 2. For each capacity clash, move the whole merge group to the smallest
//!    classroom that seats it and is free at that time.
//! 3. Rebuild occupancy. For each double booking, keep the first occupant
//!    and move every other one (a merge group moves as one) the same way.
//! 4. Stop when a pass finds nothing, or resolves nothing.
//!
//! A final read-only detection reports what is left. Moves update the
//! section period and transfer the venue booking.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use super::detector::{Entry, Occupancy, TimeKey};
use super::{Clash, ClashDetector};
use crate::models::{Booking, PeriodKind, Section, Venue};

/// Result of a resolution run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClashReport {
    /// Passes executed.
    pub passes: u32,
    /// Clashes fixed, in the order they were fixed.
    pub resolved: Vec<Clash>,
    /// Clashes still present afterwards.
    pub remaining: Vec<Clash>,
}

impl ClashReport {
    /// Whether the timetables ended clash-free.
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Iterative clash resolver.
#[derive(Debug, Clone)]
pub struct ClashResolver {
    max_iterations: u32,
}

impl Default for ClashResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ClashResolver {
    /// Creates a resolver allowing 3 passes.
    pub fn new() -> Self {
        Self { max_iterations: 3 }
    }

    /// Sets the pass budget.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Detects and repairs clashes in place.
    pub fn resolve(&self, sections: &mut [Section], venues: &mut [Venue]) -> ClashReport {
        let detector = ClashDetector::new(venues);
        let mut report = ClashReport::default();

        for _ in 0..self.max_iterations {
            report.passes += 1;
            let (found, fixed) = self.pass(&detector, sections, venues, &mut report.resolved);
            debug!(pass = report.passes, found, fixed, "clash pass");
            if found == 0 || fixed == 0 {
                break;
            }
        }

        report.remaining = detector.detect(sections);
        for clash in &report.remaining {
            warn!(%clash, "clash unresolved");
        }
        info!(
            passes = report.passes,
            resolved = report.resolved.len(),
            remaining = report.remaining.len(),
            "clash resolution complete"
        );
        report
    }

    /// One pass. Returns (clashes found, clashes fixed).
    fn pass(
        &self,
        detector: &ClashDetector,
        sections: &mut [Section],
        venues: &mut [Venue],
        resolved: &mut Vec<Clash>,
    ) -> (usize, usize) {
        let mut found = 0;
        let mut fixed = 0;

        let occupancy = Occupancy::build(sections);
        let mut used = occupancy.used();
        for finding in detector.capacity_findings(&occupancy) {
            found += 1;
            let time = (finding.clash.day, finding.clash.slot);
            let group = &finding.units[0];
            let required: u32 = group.iter().map(|e| e.strength).sum();
            if relocate_unit(detector, group, time, required, &mut used, sections, venues) {
                fixed += 1;
                resolved.push(finding.clash);
            }
        }

        let occupancy = Occupancy::build(sections);
        let mut used = occupancy.used();
        for finding in detector.double_bookings(&occupancy) {
            found += 1;
            let time = (finding.clash.day, finding.clash.slot);
            let mut all_moved = true;
            for unit in finding.units.iter().skip(1) {
                let required: u32 = unit.iter().map(|e| e.strength).sum();
                all_moved &=
                    relocate_unit(detector, unit, time, required, &mut used, sections, venues);
            }
            if all_moved {
                fixed += 1;
                resolved.push(finding.clash);
            }
        }

        (found, fixed)
    }
}

/// Moves every entry of `unit` to a free classroom seating `required`.
fn relocate_unit(
    detector: &ClashDetector,
    unit: &[Entry],
    time: TimeKey,
    required: u32,
    used: &mut BTreeMap<TimeKey, BTreeSet<String>>,
    sections: &mut [Section],
    venues: &mut [Venue],
) -> bool {
    let Some(target) = detector
        .alternate(required, used.get(&time))
        .map(str::to_string)
    else {
        let names: Vec<&str> = unit.iter().map(|e| e.section.as_str()).collect();
        warn!(
            day = %time.0,
            slot = %time.1,
            sections = ?names,
            required,
            "no free classroom large enough"
        );
        return false;
    };

    for entry in unit {
        move_entry(entry, time, &target, sections, venues);
    }
    debug!(
        day = %time.0,
        slot = %time.1,
        from = %unit[0].venue,
        to = %target,
        "reassigned"
    );
    used.entry(time).or_default().insert(target);
    true
}

fn move_entry(
    entry: &Entry,
    (day, _): TimeKey,
    target: &str,
    sections: &mut [Section],
    venues: &mut [Venue],
) {
    let Some(section) = sections.get_mut(entry.index) else {
        return;
    };
    let Some(period) = section.timetable.get_mut(day, entry.key) else {
        return;
    };
    if let PeriodKind::Regular { venue, .. } = &mut period.kind {
        *venue = target.to_string();
    }
    let slot = period.slot;

    let booking = venues
        .iter_mut()
        .find(|v| v.id == entry.venue)
        .and_then(|v| v.release(day, entry.key, &entry.section))
        .unwrap_or_else(|| Booking {
            section: entry.section.clone(),
            subject: entry.subject.clone(),
            faculty: entry.faculty.clone(),
            faculty_name: None,
        });
    if let Some(v) = venues.iter_mut().find(|v| v.id == target) {
        v.book(day, entry.key, slot, booking);
    }
}
