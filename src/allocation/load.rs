//! Per-faculty load counters.

use serde::{Deserialize, Serialize};

use crate::models::TeachingType;

/// Assignment counters for one faculty member during an allocation run.
///
/// Only subjects worth more than one credit are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyLoad {
    /// Theory assignments.
    pub theory: u32,
    /// Lab assignments.
    pub lab: u32,
    /// All counted assignments.
    pub total: u32,
}

impl FacultyLoad {
    /// Whether one more assignment of `teaching_type` stays within `limit`.
    ///
    /// A `Theory & Lab` subject needs headroom on both type counters.
    pub fn admits(&self, teaching_type: TeachingType, limit: u32) -> bool {
        let type_ok = match teaching_type {
            TeachingType::Theory => self.theory < limit,
            TeachingType::Lab => self.lab < limit,
            TeachingType::TheoryAndLab => self.theory < limit && self.lab < limit,
        };
        type_ok && self.total < limit
    }

    /// Records one assignment of `teaching_type`.
    pub fn record(&mut self, teaching_type: TeachingType) {
        match teaching_type {
            TeachingType::Theory => self.theory += 1,
            TeachingType::Lab => self.lab += 1,
            TeachingType::TheoryAndLab => {
                self.theory += 1;
                self.lab += 1;
            }
        }
        self.total += 1;
    }

    /// Whether every counter is within `limit`.
    pub fn within(&self, limit: u32) -> bool {
        self.theory <= limit && self.lab <= limit && self.total <= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_until_limit() {
        let mut load = FacultyLoad::default();
        for _ in 0..4 {
            assert!(load.admits(TeachingType::Theory, 4));
            load.record(TeachingType::Theory);
        }
        assert!(!load.admits(TeachingType::Theory, 4));
        assert!(!load.admits(TeachingType::Lab, 4)); // total exhausted
        assert!(load.within(4));
    }

    #[test]
    fn test_combined_type_counts_both() {
        let mut load = FacultyLoad::default();
        load.record(TeachingType::TheoryAndLab);
        assert_eq!(load, FacultyLoad { theory: 1, lab: 1, total: 1 });

        let busy_lab = FacultyLoad { theory: 0, lab: 2, total: 2 };
        assert!(!busy_lab.admits(TeachingType::TheoryAndLab, 2));
        assert!(!busy_lab.admits(TeachingType::Theory, 2));
    }
}
