//! Input validation for timetabling runs.
//!
//! Checks driving parameters and the structural integrity of imported
//! entities before anything is written. Detects:
//! - Missing or out-of-range run parameters
//! - Duplicate IDs
//! - References to venues that don't exist
//! - Venues and sections with zero size
//!
//! Every problem found is reported, not just the first.

use crate::config::TimetableParams;
use crate::models::{Faculty, Section, Subject, Venue};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required parameter, sheet, or column is absent.
    MissingField,
    /// A value could not be parsed.
    InvalidValue,
    /// A value parsed but lies outside the accepted range.
    OutOfRange,
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity references another that doesn't exist.
    UnknownReference,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates run parameters.
///
/// Checks:
/// 1. Institute name is present
/// 2. Day end is after day start
/// 3. Period duration is positive
/// 4. Break duration is positive when breaks are requested
/// 5. Working days is 5 or 6
pub fn validate_params(params: &TimetableParams) -> ValidationResult {
    let mut errors = Vec::new();

    if params.institute.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingField,
            "Institute name is required",
        ));
    }

    if params.day_end <= params.day_start {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            format!(
                "Day end {} must be after day start {}",
                params.day_end.format("%H:%M"),
                params.day_start.format("%H:%M")
            ),
        ));
    }

    if params.period_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            "Period duration must be at least one minute",
        ));
    }

    if params.breaks > 0 && params.break_minutes == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            format!(
                "{} breaks requested with zero break duration",
                params.breaks
            ),
        ));
    }

    if !matches!(params.working_days, 5 | 6) {
        errors.push(ValidationError::new(
            ValidationErrorKind::OutOfRange,
            format!(
                "Working days must be 5 or 6, got {}",
                params.working_days
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates imported entities.
///
/// Checks:
/// 1. No duplicate faculty, section, or venue IDs
/// 2. No duplicate subject codes within a partition
/// 3. Every venue has a positive capacity
/// 4. Every section has a positive strength
/// 5. Section home venues point to existing venues
pub fn validate_entities(
    faculty: &[Faculty],
    subjects: &[Subject],
    sections: &[Section],
    venues: &[Venue],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut faculty_ids = HashSet::new();
    for f in faculty {
        if !faculty_ids.insert(f.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate faculty ID: {}", f.id),
            ));
        }
    }

    let mut subject_codes = HashSet::new();
    for s in subjects {
        if !subject_codes.insert((s.elective, s.code.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate subject code: {}", s.code),
            ));
        }
    }

    let mut venue_ids = HashSet::new();
    for v in venues {
        if !venue_ids.insert(v.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate venue ID: {}", v.id),
            ));
        }
        if v.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("Venue '{}' has zero capacity", v.id),
            ));
        }
    }

    let mut section_ids = HashSet::new();
    for s in sections {
        if !section_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate section ID: {}", s.id),
            ));
        }
        if s.strength == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("Section '{}' has zero strength", s.id),
            ));
        }
        if let Some(home) = &s.home_venue {
            if !venue_ids.contains(home.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!("Section '{}' references unknown venue '{}'", s.id, home),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
