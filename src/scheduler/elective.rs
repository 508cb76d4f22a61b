//! Elective block scheduling.
//!
//! Every section gets two blocks of two adjacent periods, on two different
//! days, shared with the rest of its cohort so students from several
//! sections can attend the same elective offering.
//!
//! # Algorithm
//!
//! 1. Sort sections by ID and split them into contiguous cohorts; the last
//!    cohort absorbs the remainder.
//! 2. List every (day, adjacent period pair) of the timetable and shuffle
//!    the list once.
//! 3. For each cohort, scan the shuffled list and keep a pair when every
//!    member has both periods free and no elective on that day yet. Stop at
//!    two pairs on distinct days.
//! 4. Mark the kept periods `Elective`. A cohort that finds fewer than two
//!    is left untouched.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Day, Period, PeriodKey, PeriodKind, Section};
use crate::outcome::Unresolved;

/// Blocks each section receives per week.
pub const BLOCKS_PER_WEEK: usize = 2;

/// Most elective periods a section may have on one day.
pub const MAX_ELECTIVES_PER_DAY: usize = 2;

/// Two adjacent periods on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveSlot {
    pub day: Day,
    pub first: PeriodKey,
    pub second: PeriodKey,
}

/// Electives placed for one cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveBlock {
    /// Cohort number, from 1.
    pub cohort: usize,
    pub sections: Vec<String>,
    pub slots: Vec<ElectiveSlot>,
}

/// Result of an elective pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectiveOutcome {
    pub blocks: Vec<ElectiveBlock>,
    pub unresolved: Vec<Unresolved>,
}

/// Cohort-based elective scheduler.
#[derive(Debug, Clone)]
pub struct ElectiveScheduler {
    cohorts: usize,
}

impl Default for ElectiveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ElectiveScheduler {
    /// Creates a scheduler with three cohorts.
    pub fn new() -> Self {
        Self { cohorts: 3 }
    }

    /// Sets the number of cohorts (at least 1).
    pub fn with_cohorts(mut self, cohorts: usize) -> Self {
        self.cohorts = cohorts.max(1);
        self
    }

    /// Places elective blocks for every cohort.
    pub fn schedule<R: Rng>(&self, sections: &mut [Section], rng: &mut R) -> ElectiveOutcome {
        let mut outcome = ElectiveOutcome::default();

        let mut order: Vec<usize> = (0..sections.len()).collect();
        order.sort_by(|&a, &b| sections[a].id.cmp(&sections[b].id));
        let Some(&reference) = order.first() else {
            return outcome;
        };

        let mut combos = candidate_slots(&sections[reference]);
        combos.shuffle(rng);

        let cohorts = self.cohorts.max(1);
        let per_cohort = order.len() / cohorts;

        for c in 0..cohorts {
            let start = c * per_cohort;
            let end = if c + 1 < cohorts {
                (c + 1) * per_cohort
            } else {
                order.len()
            };
            let members = &order[start..end];
            if members.is_empty() {
                continue;
            }
            let names: Vec<String> = members.iter().map(|&i| sections[i].id.clone()).collect();

            let mut chosen: Vec<ElectiveSlot> = Vec::with_capacity(BLOCKS_PER_WEEK);
            for combo in &combos {
                if chosen.iter().any(|s| s.day == combo.day) {
                    continue;
                }
                if members.iter().all(|&i| admits(&sections[i], combo)) {
                    chosen.push(*combo);
                    if chosen.len() == BLOCKS_PER_WEEK {
                        break;
                    }
                }
            }

            if chosen.len() < BLOCKS_PER_WEEK {
                warn!(cohort = c + 1, sections = ?names, "no two free elective days");
                outcome.unresolved.push(Unresolved::NoElectiveSlots {
                    cohort: c + 1,
                    sections: names,
                });
                continue;
            }

            for &i in members {
                for slot in &chosen {
                    mark(&mut sections[i], slot);
                }
            }
            debug!(cohort = c + 1, slots = ?chosen, "elective block placed");
            outcome.blocks.push(ElectiveBlock {
                cohort: c + 1,
                sections: names,
                slots: chosen,
            });
        }

        info!(
            blocks = outcome.blocks.len(),
            unresolved = outcome.unresolved.len(),
            "elective scheduling complete"
        );
        outcome
    }
}

/// Every (day, adjacent pair) of a section's timetable.
fn candidate_slots(section: &Section) -> Vec<ElectiveSlot> {
    let mut slots = Vec::new();
    for day in section.timetable.days() {
        let Some(periods) = section.timetable.day(day) else {
            continue;
        };
        let keys: Vec<PeriodKey> = periods.keys().copied().collect();
        slots.extend(keys.windows(2).map(|pair| ElectiveSlot {
            day,
            first: pair[0],
            second: pair[1],
        }));
    }
    slots
}

fn admits(section: &Section, slot: &ElectiveSlot) -> bool {
    let free = |key| {
        section
            .timetable
            .get(slot.day, key)
            .is_some_and(Period::is_empty)
    };
    free(slot.first)
        && free(slot.second)
        && section.timetable.count_on(slot.day, Period::is_elective) + 2 <= MAX_ELECTIVES_PER_DAY
}

fn mark(section: &mut Section, slot: &ElectiveSlot) {
    for key in [slot.first, slot.second] {
        if let Some(period) = section.timetable.get_mut(slot.day, key) {
            period.kind = PeriodKind::Elective;
        }
    }
}
