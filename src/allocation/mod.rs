//! Faculty allocation.
//!
//! Assigns a faculty member to every (section, subject) pair.
//!
//! # Algorithm
//!
//! Regular subjects, per section in order:
//! 1. Look up faculty listing the subject, by resolved code, else by name.
//! 2. Keep those whose teaching type matches (or is `Theory & Lab`).
//! 3. For subjects over one credit, keep those with headroom under the
//!    load limit on the subject's type counter(s) and on the total.
//! 4. Pick the least-loaded candidate (first in ID order on ties) and
//!    count the assignment.
//!
//! Electives pick uniformly at random among compatible faculty whose
//! listing is marked elective, with no load accounting.
//!
//! Loads are rebuilt from zero each run, so previous allocations are
//! discarded first.

mod directory;
mod load;

pub use directory::{Candidate, FacultyDirectory};
pub use load::FacultyLoad;

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::models::{Allocation, Allocations, Faculty, Section, Subject};
use crate::outcome::Unresolved;

/// Result of an allocation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllocationOutcome {
    /// Allocations made (regular and elective).
    pub assigned: usize,
    /// Final load per faculty ID.
    pub loads: BTreeMap<String, FacultyLoad>,
    /// Pairs left without faculty.
    pub unresolved: Vec<Unresolved>,
}

/// Faculty-to-subject allocator.
#[derive(Debug, Clone)]
pub struct FacultyAllocator {
    load_limit: u32,
}

impl Default for FacultyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl FacultyAllocator {
    /// Creates an allocator with the standard limit of 4.
    pub fn new() -> Self {
        Self { load_limit: 4 }
    }

    /// Sets the per-counter load limit.
    pub fn with_load_limit(mut self, limit: u32) -> Self {
        self.load_limit = limit;
        self
    }

    /// Allocates faculty for every section, replacing previous allocations.
    pub fn allocate<R: Rng>(
        &self,
        faculty: &[Faculty],
        subjects: &[Subject],
        sections: &mut [Section],
        rng: &mut R,
    ) -> AllocationOutcome {
        let directory = FacultyDirectory::new(faculty);
        let mut outcome = AllocationOutcome::default();

        for section in sections.iter_mut() {
            section.allocations = Allocations::default();

            for subject in subjects {
                let compatible: Vec<Candidate<'_>> = directory
                    .for_subject(subject)
                    .into_iter()
                    .filter(|c| c.teaching_type.can_teach(subject.teaching_type))
                    .filter(|c| !subject.elective || c.elective)
                    .collect();

                if compatible.is_empty() {
                    warn!(
                        section = %section.id,
                        subject = %subject.code,
                        name = %subject.name,
                        "no faculty for subject"
                    );
                    outcome.unresolved.push(Unresolved::NoFaculty {
                        section: section.id.clone(),
                        subject: subject.code.clone(),
                    });
                    continue;
                }

                let chosen = if subject.elective {
                    compatible.choose(rng).copied()
                } else {
                    self.least_loaded(&compatible, subject, &outcome.loads)
                };

                let Some(chosen) = chosen else {
                    warn!(
                        section = %section.id,
                        subject = %subject.code,
                        limit = self.load_limit,
                        "all faculty at load limit"
                    );
                    outcome.unresolved.push(Unresolved::FacultyLoadExhausted {
                        section: section.id.clone(),
                        subject: subject.code.clone(),
                    });
                    continue;
                };

                if !subject.elective && subject.counts_toward_load() {
                    outcome
                        .loads
                        .entry(chosen.faculty_id.to_string())
                        .or_default()
                        .record(subject.teaching_type);
                }

                debug!(
                    section = %section.id,
                    subject = %subject.code,
                    faculty = chosen.faculty_id,
                    "allocated"
                );
                let allocation = Allocation {
                    faculty_id: chosen.faculty_id.to_string(),
                    faculty_name: chosen.faculty_name.to_string(),
                    subject_name: subject.name.clone(),
                    teaching_type: subject.teaching_type,
                    credits: subject.credits,
                };
                let partition = if subject.elective {
                    &mut section.allocations.elective
                } else {
                    &mut section.allocations.regular
                };
                partition.insert(subject.code.clone(), allocation);
                outcome.assigned += 1;
            }
        }

        info!(
            sections = sections.len(),
            assigned = outcome.assigned,
            unresolved = outcome.unresolved.len(),
            "faculty allocation complete"
        );
        outcome
    }

    fn least_loaded<'a>(
        &self,
        candidates: &[Candidate<'a>],
        subject: &Subject,
        loads: &BTreeMap<String, FacultyLoad>,
    ) -> Option<Candidate<'a>> {
        let load_of = |c: &Candidate<'_>| loads.get(c.faculty_id).copied().unwrap_or_default();
        candidates
            .iter()
            .filter(|c| {
                !subject.counts_toward_load()
                    || load_of(c).admits(subject.teaching_type, self.load_limit)
            })
            .min_by_key(|c| load_of(c).total)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capability, TeachingType};
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sections(n: usize) -> Vec<Section> {
        (0..n).map(|i| Section::new(format!("S{i}"), 60)).collect()
    }

    #[test]
    fn test_least_loaded_faculty_wins() {
        let faculty = vec![
            Faculty::new("F1").with_subject("Algorithms", TeachingType::Theory),
            Faculty::new("F2").with_subject("Algorithms", TeachingType::Theory),
        ];
        let subjects = vec![Subject::new("CS1").with_name("Algorithms").with_credits(3)];
        let mut secs = sections(3);
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = FacultyAllocator::new().allocate(&faculty, &subjects, &mut secs, &mut rng);

        assert_eq!(outcome.assigned, 3);
        let picked: Vec<_> = secs
            .iter()
            .map(|s| s.faculty_for("CS1").unwrap().faculty_id.as_str())
            .collect();
        assert_eq!(picked, vec!["F1", "F2", "F1"]);
        assert_eq!(outcome.loads["F1"].total, 2);
        assert_eq!(outcome.loads["F2"].theory, 1);
    }

    #[test]
    fn test_type_compatibility() {
        let faculty = vec![
            Faculty::new("F1").with_subject("Networks", TeachingType::Lab),
            Faculty::new("F2").with_subject("Networks", TeachingType::TheoryAndLab),
        ];
        let subjects = vec![Subject::new("CS2").with_name("Networks").with_credits(3)];
        let mut secs = sections(1);
        let mut rng = SmallRng::seed_from_u64(1);

        FacultyAllocator::new().allocate(&faculty, &subjects, &mut secs, &mut rng);
        assert_eq!(secs[0].faculty_for("CS2").unwrap().faculty_id, "F2");
    }

    #[test]
    fn test_load_limit_exhausts() {
        let faculty = vec![Faculty::new("F1").with_subject("Compilers", TeachingType::Theory)];
        let subjects = vec![Subject::new("CS3").with_name("Compilers").with_credits(4)];
        let mut secs = sections(3);
        let mut rng = SmallRng::seed_from_u64(7);

        let outcome = FacultyAllocator::new()
            .with_load_limit(2)
            .allocate(&faculty, &subjects, &mut secs, &mut rng);

        assert_eq!(outcome.assigned, 2);
        assert!(secs[2].faculty_for("CS3").is_none());
        assert!(matches!(
            outcome.unresolved.as_slice(),
            [Unresolved::FacultyLoadExhausted { section, .. }] if section == "S2"
        ));
    }

    #[test]
    fn test_one_credit_subjects_unconstrained() {
        let faculty = vec![Faculty::new("F1").with_subject("Seminar", TeachingType::Theory)];
        let subjects = vec![Subject::new("HS1").with_name("Seminar").with_credits(1)];
        let mut secs = sections(6);
        let mut rng = SmallRng::seed_from_u64(7);

        let outcome = FacultyAllocator::new().allocate(&faculty, &subjects, &mut secs, &mut rng);
        assert_eq!(outcome.assigned, 6);
        assert!(outcome.loads.is_empty());
    }

    #[test]
    fn test_unmatched_subject_is_skipped() {
        let faculty = vec![Faculty::new("F1").with_subject("Databases", TeachingType::Theory)];
        let subjects = vec![
            Subject::new("CS4").with_name("Databases").with_credits(3),
            Subject::new("CS9").with_name("Robotics").with_credits(3),
        ];
        let mut secs = sections(1);
        let mut rng = SmallRng::seed_from_u64(3);

        let outcome = FacultyAllocator::new().allocate(&faculty, &subjects, &mut secs, &mut rng);
        assert_eq!(outcome.assigned, 1);
        assert_eq!(
            outcome.unresolved,
            vec![Unresolved::NoFaculty {
                section: "S0".into(),
                subject: "CS9".into()
            }]
        );
    }

    #[test]
    fn test_electives_ignore_load() {
        let faculty = vec![
            Faculty::new("F1").with_elective("Cloud Computing: Elective", TeachingType::Theory),
            Faculty::new("F2").with_elective("Cloud Computing", TeachingType::Theory),
        ];
        let subjects = vec![Subject::new("EL1")
            .with_name("Cloud Computing Elective")
            .with_credits(3)
            .elective()];
        let mut secs = sections(10);
        let mut rng = SmallRng::seed_from_u64(11);

        let outcome = FacultyAllocator::new()
            .with_load_limit(1)
            .allocate(&faculty, &subjects, &mut secs, &mut rng);

        assert_eq!(outcome.assigned, 10);
        assert!(outcome.loads.is_empty());
        assert!(secs.iter().all(|s| s.allocations.elective.contains_key("EL1")));
    }

    #[test]
    fn test_electives_need_elective_listing() {
        let faculty = vec![
            Faculty::new("F1").with_subject("Cloud Computing", TeachingType::Theory),
            Faculty::new("F2").with_elective("Cloud Computing", TeachingType::Theory),
        ];
        let subjects = vec![Subject::new("EL1")
            .with_name("Cloud Computing Elective")
            .with_credits(3)
            .elective()];
        let mut secs = sections(8);
        let mut rng = SmallRng::seed_from_u64(2);

        FacultyAllocator::new().allocate(&faculty, &subjects, &mut secs, &mut rng);
        assert!(secs
            .iter()
            .all(|s| s.allocations.elective["EL1"].faculty_id == "F2"));

        let regular_only = vec![faculty[0].clone()];
        let outcome =
            FacultyAllocator::new().allocate(&regular_only, &subjects, &mut secs, &mut rng);
        assert_eq!(outcome.assigned, 0);
        assert!(matches!(outcome.unresolved[0], Unresolved::NoFaculty { .. }));
    }

    #[test]
    fn test_shared_name_allocated_by_code() {
        let coded = |code: &str| Capability {
            subject: "Data Mining".into(),
            subject_code: Some(code.into()),
            teaching_type: TeachingType::Theory,
            elective: false,
        };
        let faculty = vec![
            Faculty::new("F1").with_capability(coded("CS301")),
            Faculty::new("F2").with_capability(coded("CS302")),
        ];
        let subjects = vec![
            Subject::new("CS301").with_name("Data Mining").with_credits(3),
            Subject::new("CS302").with_name("Data Mining").with_credits(3),
        ];
        let mut secs = sections(2);
        let mut rng = SmallRng::seed_from_u64(8);

        let outcome = FacultyAllocator::new().allocate(&faculty, &subjects, &mut secs, &mut rng);

        assert_eq!(outcome.assigned, 4);
        for section in &secs {
            assert_eq!(section.faculty_for("CS301").unwrap().faculty_id, "F1");
            assert_eq!(section.faculty_for("CS302").unwrap().faculty_id, "F2");
        }
    }

    #[test]
    fn test_reallocation_replaces_previous() {
        let faculty = vec![Faculty::new("F1").with_subject("Graphics", TeachingType::Theory)];
        let subjects = vec![Subject::new("CS5").with_name("Graphics").with_credits(3)];
        let mut secs = sections(1);
        let mut rng = SmallRng::seed_from_u64(5);
        let allocator = FacultyAllocator::new();

        allocator.allocate(&faculty, &subjects, &mut secs, &mut rng);
        let outcome = allocator.allocate(&faculty, &subjects, &mut secs, &mut rng);
        assert_eq!(secs[0].allocations.len(), 1);
        assert_eq!(outcome.loads["F1"].total, 1);
    }

    proptest! {
        #[test]
        fn prop_load_never_exceeds_limit(
            seed in any::<u64>(),
            n_sections in 1usize..10,
            n_faculty in 1usize..5,
            credits in proptest::collection::vec(0u32..5, 1..8),
        ) {
            let types = [TeachingType::Theory, TeachingType::Lab, TeachingType::TheoryAndLab];
            let subjects: Vec<Subject> = credits
                .iter()
                .enumerate()
                .map(|(i, &c)| {
                    Subject::new(format!("C{i}"))
                        .with_name(format!("Subject {i}"))
                        .with_type(types[i % 3])
                        .with_credits(c)
                })
                .collect();
            let faculty: Vec<Faculty> = (0..n_faculty)
                .map(|f| {
                    subjects.iter().enumerate().fold(Faculty::new(format!("F{f}")), |acc, (i, s)| {
                        acc.with_subject(s.name.clone(), types[(i + f) % 3])
                    })
                })
                .collect();
            let mut secs = sections(n_sections);
            let mut rng = SmallRng::seed_from_u64(seed);

            let outcome = FacultyAllocator::new().allocate(&faculty, &subjects, &mut secs, &mut rng);

            let mut recount: BTreeMap<String, FacultyLoad> = BTreeMap::new();
            for section in &secs {
                for alloc in section.allocations.regular.values() {
                    if alloc.credits > 1 {
                        recount
                            .entry(alloc.faculty_id.clone())
                            .or_default()
                            .record(alloc.teaching_type);
                    }
                }
            }
            for load in recount.values() {
                prop_assert!(load.within(4));
            }
            prop_assert_eq!(recount, outcome.loads);
        }
    }
}
