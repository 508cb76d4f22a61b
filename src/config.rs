//! Run configuration.
//!
//! [`TimetableParams`] describe the institute's day (start, end, period and
//! break lengths, working days). [`SchedulerConfig`] holds the tuning knobs
//! of the scheduling stages. Both load from TOML via [`RunConfig`]:
//!
//! ```toml
//! [params]
//! institute = "iiit"
//! day_start = "09:00"
//! day_end = "16:00"
//! period_minutes = 50
//! breaks = 2
//! break_minutes = 10
//! working_days = 5
//!
//! [scheduler]
//! max_iterations = 3
//! seed = 7
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TimetableError;
use crate::models::{hhmm, parse_hhmm, Day};
use crate::slots::SlotParams;
use crate::validation::{validate_params, ValidationError, ValidationErrorKind};

/// Driving parameters of one timetabling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableParams {
    /// Institute namespace in the entity store.
    pub institute: String,
    /// First period start.
    #[serde(with = "hhmm")]
    pub day_start: NaiveTime,
    /// Latest period end.
    #[serde(with = "hhmm")]
    pub day_end: NaiveTime,
    /// Class period length (minutes).
    pub period_minutes: u32,
    /// Number of short breaks per day.
    #[serde(default)]
    pub breaks: u32,
    /// Short break length (minutes).
    #[serde(default)]
    pub break_minutes: u32,
    /// Working days per week (5 or 6).
    #[serde(default = "default_working_days")]
    pub working_days: u8,
}

fn default_working_days() -> u8 {
    5
}

impl TimetableParams {
    /// Creates parameters with 60-minute periods, no breaks, five days.
    pub fn new(institute: impl Into<String>, day_start: NaiveTime, day_end: NaiveTime) -> Self {
        Self {
            institute: institute.into(),
            day_start,
            day_end,
            period_minutes: 60,
            breaks: 0,
            break_minutes: 0,
            working_days: default_working_days(),
        }
    }

    /// Sets the period length.
    pub fn with_period_minutes(mut self, minutes: u32) -> Self {
        self.period_minutes = minutes;
        self
    }

    /// Sets the break count and length.
    pub fn with_breaks(mut self, breaks: u32, minutes: u32) -> Self {
        self.breaks = breaks;
        self.break_minutes = minutes;
        self
    }

    /// Sets the number of working days.
    pub fn with_working_days(mut self, days: u8) -> Self {
        self.working_days = days;
        self
    }

    /// Rejects invalid parameters.
    pub fn validate(&self) -> Result<(), TimetableError> {
        validate_params(self).map_err(TimetableError::Validation)
    }

    /// Slot generator input for one day.
    pub fn slot_params(&self) -> SlotParams {
        SlotParams {
            start: self.day_start,
            end: self.day_end,
            period_minutes: self.period_minutes,
            breaks: self.breaks,
            break_minutes: self.break_minutes,
        }
    }

    /// Working days in order.
    pub fn days(&self) -> Vec<Day> {
        Day::week(usize::from(self.working_days))
    }
}

/// Unparsed parameters as entered in a form or on a command line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParams {
    pub institute: String,
    pub day_start: String,
    pub day_end: String,
    pub period_minutes: String,
    pub breaks: String,
    pub break_minutes: String,
    pub working_days: String,
}

impl TryFrom<RawParams> for TimetableParams {
    type Error = Vec<ValidationError>;

    /// Parses every field, collecting all errors, then range-checks the result.
    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let mut time = |field: &str, value: &str| match parse_hhmm(value) {
            Ok(t) => Some(t),
            Err(_) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    format!("{field} must be HH:MM, got '{value}'"),
                ));
                None
            }
        };
        let start = time("Day start", &raw.day_start);
        let end = time("Day end", &raw.day_end);

        let mut number = |field: &str, value: &str| match value.trim().parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    format!("{field} must be a whole number, got '{value}'"),
                ));
                None
            }
        };
        let period = number("Period duration", &raw.period_minutes);
        let breaks = number("Number of breaks", &raw.breaks);
        let break_minutes = number("Break duration", &raw.break_minutes);
        let days = number("Working days", &raw.working_days);

        let (Some(start), Some(end), Some(period), Some(breaks), Some(break_minutes), Some(days)) =
            (start, end, period, breaks, break_minutes, days)
        else {
            return Err(errors);
        };

        let params = TimetableParams::new(raw.institute.trim(), start, end)
            .with_period_minutes(period)
            .with_breaks(breaks, break_minutes)
            .with_working_days(u8::try_from(days).unwrap_or(u8::MAX));
        validate_params(&params)?;
        Ok(params)
    }
}

/// Tuning knobs of the scheduling stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Clash detection/resolution passes.
    pub max_iterations: u32,
    /// Random-day attempts per theory subject per section.
    pub attempt_budget: u32,
    /// Number of elective cohorts sections are split into.
    pub elective_cohorts: usize,
    /// Per-faculty Theory, Lab, and total assignment cap.
    pub load_limit: u32,
    /// Probability of reusing the section's home venue.
    pub home_venue_bias: f64,
    /// Lunch window half-width around 12:00 and 13:00 (minutes).
    pub lunch_window_minutes: u32,
    /// Seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            attempt_budget: 20,
            elective_cohorts: 3,
            load_limit: 4,
            home_venue_bias: 0.8,
            lunch_window_minutes: 15,
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Fixes the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the clash pass budget.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// A complete run configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub params: TimetableParams,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl RunConfig {
    /// Parses TOML.
    pub fn from_toml(text: &str) -> Result<Self, TimetableError> {
        toml::from_str(text).map_err(|e| TimetableError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self, TimetableError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TimetableError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }
}
