//! Lunch assignment.
//!
//! Gives every section-day exactly one Lunch period. Free periods starting
//! near 12:00 or 13:00 are preferred; any free period is the fallback.

use chrono::NaiveTime;
use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Day, Period, PeriodKey, PeriodKind, Section};
use crate::outcome::Unresolved;

/// Hours around which lunch is preferred.
const LUNCH_HOURS: [u32; 2] = [12, 13];

/// Result of a lunch pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LunchOutcome {
    /// Lunch periods placed.
    pub assigned: usize,
    /// Section-days left without lunch.
    pub unresolved: Vec<Unresolved>,
}

/// Places one Lunch period per section per day.
#[derive(Debug, Clone)]
pub struct LunchAssigner {
    window_minutes: u32,
}

impl Default for LunchAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl LunchAssigner {
    /// Creates an assigner with a ±15 minute window.
    pub fn new() -> Self {
        Self { window_minutes: 15 }
    }

    /// Sets the half-width of the preferred window.
    pub fn with_window(mut self, minutes: u32) -> Self {
        self.window_minutes = minutes;
        self
    }

    /// Assigns lunch on every day that lacks one.
    pub fn assign<R: Rng>(&self, sections: &mut [Section], rng: &mut R) -> LunchOutcome {
        let mut outcome = LunchOutcome::default();

        for section in sections.iter_mut() {
            let days: Vec<Day> = section.timetable.days().collect();
            for day in days {
                if section.timetable.count_on(day, Period::is_lunch) > 0 {
                    continue;
                }
                let Some(periods) = section.timetable.day_mut(day) else {
                    continue;
                };

                let free: Vec<(PeriodKey, NaiveTime)> = periods
                    .iter()
                    .filter(|(_, p)| p.is_empty())
                    .map(|(&key, p)| (key, p.slot.start))
                    .collect();
                let preferred: Vec<(PeriodKey, NaiveTime)> = free
                    .iter()
                    .copied()
                    .filter(|&(_, start)| self.near_lunch_hour(start))
                    .collect();
                let pool = if preferred.is_empty() { &free } else { &preferred };

                match pool.choose(rng) {
                    Some(&(key, _)) => {
                        if let Some(period) = periods.get_mut(&key) {
                            period.kind = PeriodKind::Lunch;
                        }
                        debug!(section = %section.id, %day, %key, "lunch placed");
                        outcome.assigned += 1;
                    }
                    None => {
                        warn!(section = %section.id, %day, "no free slot for lunch");
                        outcome.unresolved.push(Unresolved::NoLunchSlot {
                            section: section.id.clone(),
                            day,
                        });
                    }
                }
            }
        }

        info!(
            assigned = outcome.assigned,
            unresolved = outcome.unresolved.len(),
            "lunch assignment complete"
        );
        outcome
    }

    fn near_lunch_hour(&self, start: NaiveTime) -> bool {
        let window = i64::from(self.window_minutes);
        LUNCH_HOURS.iter().any(|&hour| {
            NaiveTime::from_hms_opt(hour, 0, 0).is_some_and(|anchor| {
                start.signed_duration_since(anchor).num_minutes().abs() <= window
            })
        })
    }
}
