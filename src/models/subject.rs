//! Subject model.
//!
//! A subject is taught to every section. Its credit count sets how many
//! periods per week must be placed; subjects worth more than one credit
//! also count against faculty load limits.

use serde::{Deserialize, Serialize};

use super::TeachingType;

/// A subject (course) to be taught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Subject code, unique within its regular/elective partition.
    pub code: String,
    /// Display name.
    pub name: String,
    /// How the subject is taught.
    pub teaching_type: TeachingType,
    /// Weekly credit count (periods to place).
    pub credits: u32,
    /// Whether the subject belongs to the elective partition.
    #[serde(default)]
    pub elective: bool,
}

impl Subject {
    /// Creates a regular theory subject with zero credits.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            teaching_type: TeachingType::Theory,
            credits: 0,
            elective: false,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the teaching type.
    pub fn with_type(mut self, teaching_type: TeachingType) -> Self {
        self.teaching_type = teaching_type;
        self
    }

    /// Sets the credit count.
    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    /// Moves the subject into the elective partition.
    pub fn elective(mut self) -> Self {
        self.elective = true;
        self
    }

    /// Whether assigning this subject counts against faculty load limits.
    #[inline]
    pub fn counts_toward_load(&self) -> bool {
        self.credits > 1
    }

    /// Display name with any elective suffix removed, for faculty matching.
    pub fn match_name(&self) -> String {
        normalize_subject_name(&self.name)
    }
}

/// Strips `: Elective` / `Elective` markers and surrounding whitespace.
pub fn normalize_subject_name(name: &str) -> String {
    name.replace(": Elective", "")
        .replace("Elective", "")
        .trim()
        .to_string()
}
