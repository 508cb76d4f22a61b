//! Run orchestration.
//!
//! # Algorithm
//!
//! 1. Validate parameters (nothing is written on failure).
//! 2. Take the institute's run lease.
//! 3. Require faculty and sections to exist.
//! 4. Run the stages in order, each reading a fresh snapshot from the store
//!    and committing one [`WriteSet`]:
//!    faculty allocation, skeleton, lunch, electives, theory, clash repair.
//! 5. Return a [`RunReport`] with counts and every unresolved item.
//!
//! Per-item failures never abort the run. Only invalid parameters, missing
//! foundational data and store failures do.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

use crate::allocation::FacultyAllocator;
use crate::clash::ClashResolver;
use crate::config::{RunConfig, SchedulerConfig, TimetableParams};
use crate::error::TimetableError;
use crate::outcome::{Category, Unresolved};
use crate::scheduler::{ElectiveBlock, ElectiveScheduler, LunchAssigner, Skeleton, TheoryAssigner};
use crate::store::{EntityStore, Metadata, RunLease, WriteSet};

/// Summary of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub institute: String,
    /// (section, subject) pairs given a faculty member.
    pub allocations: usize,
    /// Lunch periods placed.
    pub lunches: usize,
    /// Elective blocks reserved, one per cohort that found two days.
    pub elective_blocks: Vec<ElectiveBlock>,
    /// Theory periods placed.
    pub placed_periods: usize,
    pub clash_passes: u32,
    pub clashes_resolved: usize,
    /// Everything left undone, including clashes still standing.
    pub unresolved: Vec<Unresolved>,
}

impl RunReport {
    /// Whether nothing was left unresolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Unresolved item counts per category.
    pub fn by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.unresolved {
            *counts.entry(item.category()).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Institute: {}", self.institute)?;
        writeln!(f, "  Faculty allocations: {}", self.allocations)?;
        writeln!(f, "  Lunch periods:       {}", self.lunches)?;
        writeln!(f, "  Elective blocks:     {}", self.elective_blocks.len())?;
        writeln!(f, "  Theory periods:      {}", self.placed_periods)?;
        writeln!(
            f,
            "  Clashes resolved:    {} in {} pass(es)",
            self.clashes_resolved, self.clash_passes
        )?;
        if self.unresolved.is_empty() {
            return writeln!(f, "  Unresolved:          none");
        }
        let summary: Vec<String> = self
            .by_category()
            .iter()
            .map(|(category, n)| format!("{category}: {n}"))
            .collect();
        writeln!(f, "  Unresolved:          {}", summary.join(", "))?;
        for item in &self.unresolved {
            writeln!(f, "    - {item}")?;
        }
        Ok(())
    }
}

/// Timetabling pipeline over an [`EntityStore`].
///
/// # Example
///
/// ```
/// use u_timetable::config::TimetableParams;
/// use u_timetable::models::{parse_hhmm, Faculty, Section, Subject, TeachingType, Venue};
/// use u_timetable::pipeline::Pipeline;
/// use u_timetable::store::{MemoryStore, WriteSet, EntityStore};
///
/// let store = MemoryStore::new();
/// store.commit("iiit", WriteSet::new()
///     .with_faculty(vec![Faculty::new("F1").with_subject("OS", TeachingType::Theory)])
///     .with_subjects(vec![Subject::new("CS1").with_name("OS").with_credits(3)])
///     .with_sections(vec![Section::new("A", 40)])
///     .with_venues(vec![Venue::classroom("R1", 60)])).unwrap();
///
/// let params = TimetableParams::new("iiit", parse_hhmm("09:00").unwrap(), parse_hhmm("15:00").unwrap());
/// let report = Pipeline::new(&store, params).with_seed(7).run().unwrap();
/// assert_eq!(report.placed_periods, 3);
/// ```
#[derive(Debug)]
pub struct Pipeline<'a, S: EntityStore + ?Sized> {
    store: &'a S,
    params: TimetableParams,
    config: SchedulerConfig,
}

impl<'a, S: EntityStore + ?Sized> Pipeline<'a, S> {
    /// Creates a pipeline with default scheduler settings.
    pub fn new(store: &'a S, params: TimetableParams) -> Self {
        Self {
            store,
            params,
            config: SchedulerConfig::default(),
        }
    }

    /// Creates a pipeline from a loaded configuration file.
    pub fn from_config(store: &'a S, config: RunConfig) -> Self {
        Self {
            store,
            params: config.params,
            config: config.scheduler,
        }
    }

    /// Sets the scheduler settings.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Fixes the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    fn institute(&self) -> &str {
        &self.params.institute
    }

    /// Runs every stage, seeding from the configuration or OS entropy.
    pub fn run(&self) -> Result<RunReport, TimetableError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.run_with_rng(&mut rng)
    }

    /// Runs every stage with the caller's random source.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<RunReport, TimetableError> {
        self.params.validate()?;
        let _lease = RunLease::acquire(self.store, self.institute())?;
        self.check_foundations()?;
        info!(institute = self.institute(), "timetable run started");

        let mut report = RunReport {
            institute: self.institute().to_string(),
            ..RunReport::default()
        };

        self.allocate_faculty(rng, &mut report)?;
        self.build_skeleton()?;
        self.assign_lunch(rng, &mut report)?;
        self.schedule_electives(rng, &mut report)?;
        self.assign_theory(rng, &mut report)?;
        self.resolve_clashes(&mut report)?;

        if report.is_complete() {
            info!(institute = self.institute(), "timetable run complete");
        } else {
            warn!(
                institute = self.institute(),
                unresolved = report.unresolved.len(),
                "timetable run complete with unresolved items"
            );
        }
        Ok(report)
    }

    fn check_foundations(&self) -> Result<(), TimetableError> {
        let institute = self.institute();
        if self.store.faculty(institute)?.is_empty() {
            return Err(TimetableError::DataIntegrity(format!(
                "no faculty for institute '{institute}'"
            )));
        }
        if self.store.sections(institute)?.is_empty() {
            return Err(TimetableError::DataIntegrity(format!(
                "no sections for institute '{institute}'"
            )));
        }
        Ok(())
    }

    fn allocate_faculty<R: Rng>(
        &self,
        rng: &mut R,
        report: &mut RunReport,
    ) -> Result<(), TimetableError> {
        let institute = self.institute();
        let faculty = self.store.faculty(institute)?;
        let subjects = self.store.subjects(institute)?;
        let mut sections = self.store.sections(institute)?;

        let outcome = FacultyAllocator::new()
            .with_load_limit(self.config.load_limit)
            .allocate(&faculty, &subjects, &mut sections, rng);

        self.store
            .commit(institute, WriteSet::new().with_sections(sections))?;
        report.allocations = outcome.assigned;
        report.unresolved.extend(outcome.unresolved);
        Ok(())
    }

    /// Resets every timetable to empty periods. Lunch must be placed again.
    fn build_skeleton(&self) -> Result<(), TimetableError> {
        let institute = self.institute();
        let mut sections = self.store.sections(institute)?;
        let mut venues = self.store.venues(institute)?;

        let skeleton = Skeleton::new(&self.params)?;
        skeleton.apply(&mut sections, &mut venues);
        info!(
            institute,
            days = skeleton.days().len(),
            periods = skeleton.periods_per_day(),
            "skeleton applied"
        );

        let mut metadata = self.store.metadata(institute)?;
        metadata.lunch_assigned = false;
        self.store.commit(
            institute,
            WriteSet::new()
                .with_sections(sections)
                .with_venues(venues)
                .with_metadata(metadata),
        )?;
        Ok(())
    }

    /// Skipped when the current skeleton already has lunch.
    fn assign_lunch<R: Rng>(&self, rng: &mut R, report: &mut RunReport) -> Result<(), TimetableError> {
        let institute = self.institute();
        if self.store.metadata(institute)?.lunch_assigned {
            info!(institute, "lunch already assigned, skipping");
            return Ok(());
        }
        let mut sections = self.store.sections(institute)?;

        let outcome = LunchAssigner::new()
            .with_window(self.config.lunch_window_minutes)
            .assign(&mut sections, rng);

        self.store.commit(
            institute,
            WriteSet::new()
                .with_sections(sections)
                .with_metadata(Metadata {
                    lunch_assigned: true,
                }),
        )?;
        report.lunches += outcome.assigned;
        report.unresolved.extend(outcome.unresolved);
        Ok(())
    }

    fn schedule_electives<R: Rng>(
        &self,
        rng: &mut R,
        report: &mut RunReport,
    ) -> Result<(), TimetableError> {
        let institute = self.institute();
        let mut sections = self.store.sections(institute)?;

        let outcome = ElectiveScheduler::new()
            .with_cohorts(self.config.elective_cohorts)
            .schedule(&mut sections, rng);

        self.store
            .commit(institute, WriteSet::new().with_sections(sections))?;
        report.elective_blocks = outcome.blocks;
        report.unresolved.extend(outcome.unresolved);
        Ok(())
    }

    fn assign_theory<R: Rng>(&self, rng: &mut R, report: &mut RunReport) -> Result<(), TimetableError> {
        let institute = self.institute();
        let subjects = self.store.subjects(institute)?;
        let mut sections = self.store.sections(institute)?;
        let mut venues = self.store.venues(institute)?;

        let outcome = TheoryAssigner::new()
            .with_attempt_budget(self.config.attempt_budget)
            .with_home_venue_bias(self.config.home_venue_bias)
            .assign(&subjects, &mut sections, &mut venues, rng);

        self.store.commit(
            institute,
            WriteSet::new().with_sections(sections).with_venues(venues),
        )?;
        report.placed_periods = outcome.placed;
        report.unresolved.extend(outcome.unresolved);
        Ok(())
    }

    fn resolve_clashes(&self, report: &mut RunReport) -> Result<(), TimetableError> {
        let institute = self.institute();
        let mut sections = self.store.sections(institute)?;
        let mut venues = self.store.venues(institute)?;

        let clashes = ClashResolver::new()
            .with_max_iterations(self.config.max_iterations)
            .resolve(&mut sections, &mut venues);

        self.store.commit(
            institute,
            WriteSet::new().with_sections(sections).with_venues(venues),
        )?;
        report.clash_passes = clashes.passes;
        report.clashes_resolved = clashes.resolved.len();
        report
            .unresolved
            .extend(clashes.remaining.into_iter().map(Unresolved::Clash));
        Ok(())
    }
}
