//! Theory period placement.
//!
//! Places the credit periods of each regular Theory subject into free
//! periods of a section's timetable and mirrors each placement into the
//! chosen venue's timetable.
//!
//! # Algorithm
//!
//! Per section, per subject, until the credits are placed or the attempt
//! budget runs out:
//! 1. Pick a random day. Skip it if the subject already has 2 periods there.
//! 2. Scan the day in period order for a free period.
//! 3. With 2+ credits left, the next period free, and nothing of the
//!    subject on this day yet, place a double period; else a single one.
//! 4. Pick a venue: the section's home venue with probability
//!    `home_venue_bias` (when it fits), else a random other classroom that
//!    fits. With no classroom large enough the subject is given up for the
//!    section and reported as a capacity failure.
//!
//! The first successful placement fixes the section's home venue.

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{
    Booking, Day, PeriodKey, PeriodKind, Section, Subject, TeachingType, Venue,
};
use crate::outcome::Unresolved;

/// Most periods of one subject on one day.
pub const MAX_SUBJECT_PERIODS_PER_DAY: usize = 2;

/// What happened at a scanned period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementKind {
    /// Two consecutive periods placed.
    Double,
    /// One period placed.
    Single,
    /// Free period left unused: no classroom fits the section.
    SkippedNoVenue,
}

/// One placement decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementEvent {
    pub section: String,
    pub subject: String,
    pub day: Day,
    /// First period of the placement.
    pub key: PeriodKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    pub kind: PlacementKind,
}

/// Result of a theory pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TheoryOutcome {
    /// Periods filled.
    pub placed: usize,
    pub events: Vec<PlacementEvent>,
    pub unresolved: Vec<Unresolved>,
}

/// Randomized theory period assigner.
#[derive(Debug, Clone)]
pub struct TheoryAssigner {
    attempt_budget: u32,
    home_venue_bias: f64,
}

impl Default for TheoryAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl TheoryAssigner {
    /// Creates an assigner with 20 attempts per subject and a 0.8 home bias.
    pub fn new() -> Self {
        Self {
            attempt_budget: 20,
            home_venue_bias: 0.8,
        }
    }

    /// Sets the random-day attempts allowed per subject.
    pub fn with_attempt_budget(mut self, attempts: u32) -> Self {
        self.attempt_budget = attempts;
        self
    }

    /// Sets the probability of reusing the home venue.
    pub fn with_home_venue_bias(mut self, bias: f64) -> Self {
        self.home_venue_bias = bias;
        self
    }

    /// Places every regular Theory subject for every section.
    pub fn assign<R: Rng>(
        &self,
        subjects: &[Subject],
        sections: &mut [Section],
        venues: &mut [Venue],
        rng: &mut R,
    ) -> TheoryOutcome {
        let mut outcome = TheoryOutcome::default();
        let theory: Vec<&Subject> = subjects
            .iter()
            .filter(|s| !s.elective && s.teaching_type == TeachingType::Theory)
            .collect();

        for section in sections.iter_mut() {
            let days: Vec<Day> = section.timetable.days().collect();
            if days.is_empty() {
                continue;
            }

            for &subject in &theory {
                let mut remaining = subject.credits;
                let mut attempts = 0;
                let mut no_venue = false;

                while remaining > 0 && attempts < self.attempt_budget {
                    attempts += 1;
                    let Some(&day) = days.choose(rng) else {
                        break;
                    };
                    let placed_today = section
                        .timetable
                        .count_on(day, |p| p.subject() == Some(subject.code.as_str()));
                    if placed_today >= MAX_SUBJECT_PERIODS_PER_DAY {
                        continue;
                    }
                    let Some(placed) = self.place_on_day(
                        section,
                        subject,
                        day,
                        remaining,
                        placed_today,
                        venues,
                        rng,
                        &mut outcome.events,
                    ) else {
                        warn!(
                            section = %section.id,
                            subject = %subject.code,
                            %day,
                            strength = section.strength,
                            "no classroom fits section"
                        );
                        outcome.unresolved.push(Unresolved::NoVenue {
                            section: section.id.clone(),
                            subject: subject.code.clone(),
                            day,
                            remaining,
                        });
                        no_venue = true;
                        break;
                    };
                    remaining = remaining.saturating_sub(placed);
                    outcome.placed += placed as usize;
                }

                if remaining > 0 && !no_venue {
                    warn!(
                        section = %section.id,
                        subject = %subject.code,
                        remaining,
                        "credits left unplaced"
                    );
                    outcome.unresolved.push(Unresolved::CreditsUnplaced {
                        section: section.id.clone(),
                        subject: subject.code.clone(),
                        remaining,
                    });
                }
            }
        }

        info!(
            placed = outcome.placed,
            unresolved = outcome.unresolved.len(),
            "theory placement complete"
        );
        outcome
    }

    /// Tries one placement on `day`. Returns the periods filled (0, 1, or 2),
    /// or `None` when no classroom fits the section.
    #[allow(clippy::too_many_arguments)]
    fn place_on_day<R: Rng>(
        &self,
        section: &mut Section,
        subject: &Subject,
        day: Day,
        remaining: u32,
        placed_today: usize,
        venues: &mut [Venue],
        rng: &mut R,
        events: &mut Vec<PlacementEvent>,
    ) -> Option<u32> {
        let free: Vec<(PeriodKey, bool)> = match section.timetable.day(day) {
            Some(periods) => periods.iter().map(|(&k, p)| (k, p.is_empty())).collect(),
            None => return Some(0),
        };

        for (i, &(key, is_free)) in free.iter().enumerate() {
            if !is_free {
                continue;
            }
            let next_free = free.get(i + 1).filter(|(_, f)| *f).map(|&(k, _)| k);

            let Some(venue) = self.pick_venue(section, venues, rng) else {
                debug!(section = %section.id, subject = %subject.code, %day, %key, "no venue fits");
                events.push(PlacementEvent {
                    section: section.id.clone(),
                    subject: subject.code.clone(),
                    day,
                    key,
                    venue: None,
                    kind: PlacementKind::SkippedNoVenue,
                });
                return None;
            };

            let (keys, kind) = match next_free {
                Some(next) if remaining >= 2 && placed_today == 0 => {
                    (vec![key, next], PlacementKind::Double)
                }
                _ => (vec![key], PlacementKind::Single),
            };
            for &k in &keys {
                book(section, subject, day, k, &venue, venues);
            }
            debug!(
                section = %section.id,
                subject = %subject.code,
                %day,
                %key,
                venue = %venue,
                kind = ?kind,
                "theory placed"
            );
            if section.home_venue.is_none() {
                section.home_venue = Some(venue.clone());
            }
            events.push(PlacementEvent {
                section: section.id.clone(),
                subject: subject.code.clone(),
                day,
                key,
                venue: Some(venue),
                kind,
            });
            return Some(keys.len() as u32);
        }
        Some(0)
    }

    fn pick_venue<R: Rng>(
        &self,
        section: &Section,
        venues: &[Venue],
        rng: &mut R,
    ) -> Option<String> {
        let home_id = section.home_venue.as_deref();
        let home = home_id.and_then(|id| {
            venues
                .iter()
                .find(|v| v.id == id && v.is_classroom() && v.fits(section.strength))
        });
        if let Some(home) = home {
            if rng.random::<f64>() < self.home_venue_bias {
                return Some(home.id.clone());
            }
        }

        let others: Vec<&Venue> = venues
            .iter()
            .filter(|v| v.is_classroom() && v.fits(section.strength))
            .filter(|v| Some(v.id.as_str()) != home_id)
            .collect();
        others
            .choose(rng)
            .copied()
            .or(home)
            .map(|v| v.id.clone())
    }
}

/// Fills the section period and mirrors the booking into the venue.
fn book(
    section: &mut Section,
    subject: &Subject,
    day: Day,
    key: PeriodKey,
    venue_id: &str,
    venues: &mut [Venue],
) {
    let allocation = section.faculty_for(&subject.code).cloned();
    let Some(period) = section.timetable.get_mut(day, key) else {
        return;
    };
    period.kind = PeriodKind::Regular {
        subject: subject.code.clone(),
        venue: venue_id.to_string(),
        faculty: allocation.as_ref().map(|a| a.faculty_id.clone()),
    };
    let slot = period.slot;

    if let Some(venue) = venues.iter_mut().find(|v| v.id == venue_id) {
        venue.book(
            day,
            key,
            slot,
            Booking {
                section: section.id.clone(),
                subject: subject.code.clone(),
                faculty: allocation.as_ref().map(|a| a.faculty_id.clone()),
                faculty_name: allocation.map(|a| a.faculty_name),
            },
        );
    }
}
