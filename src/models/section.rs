//! Section model.
//!
//! A section is a cohort of students sharing one timetable. It carries the
//! faculty allocations made for it and its weekly timetable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{SectionTimetable, TeachingType};

/// A faculty assignment for one subject of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Assigned faculty ID.
    pub faculty_id: String,
    /// Assigned faculty display name.
    pub faculty_name: String,
    /// Subject display name.
    pub subject_name: String,
    /// Subject teaching type.
    pub teaching_type: TeachingType,
    /// Subject credits.
    pub credits: u32,
}

/// Subject code → allocation, split by partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocations {
    /// Regular (non-elective) subjects.
    #[serde(default)]
    pub regular: BTreeMap<String, Allocation>,
    /// Elective subjects.
    #[serde(default)]
    pub elective: BTreeMap<String, Allocation>,
}

impl Allocations {
    /// Total number of allocations.
    pub fn len(&self) -> usize {
        self.regular.len() + self.elective.len()
    }

    /// Whether nothing is allocated.
    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.elective.is_empty()
    }
}

/// A student section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Number of students.
    pub strength: u32,
    /// Faculty allocations.
    #[serde(default)]
    pub allocations: Allocations,
    /// Weekly timetable.
    #[serde(default)]
    pub timetable: SectionTimetable,
    /// Venue the section normally sits in, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_venue: Option<String>,
}

impl Section {
    /// Creates a section with an empty timetable.
    pub fn new(id: impl Into<String>, strength: u32) -> Self {
        Self {
            id: id.into(),
            strength,
            allocations: Allocations::default(),
            timetable: SectionTimetable::new(),
            home_venue: None,
        }
    }

    /// Sets the home venue.
    pub fn with_home_venue(mut self, venue: impl Into<String>) -> Self {
        self.home_venue = Some(venue.into());
        self
    }

    /// Allocation for a regular subject.
    pub fn faculty_for(&self, subject_code: &str) -> Option<&Allocation> {
        self.allocations.regular.get(subject_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_builder() {
        let s = Section::new("CSE-A", 60).with_home_venue("R101");
        assert_eq!(s.id, "CSE-A");
        assert_eq!(s.strength, 60);
        assert_eq!(s.home_venue.as_deref(), Some("R101"));
        assert!(s.allocations.is_empty());
        assert!(s.timetable.is_empty());
    }

    #[test]
    fn test_faculty_lookup() {
        let mut s = Section::new("CSE-A", 60);
        s.allocations.regular.insert(
            "CS301".into(),
            Allocation {
                faculty_id: "F1".into(),
                faculty_name: "Dr. Rao".into(),
                subject_name: "Compiler Design".into(),
                teaching_type: TeachingType::Theory,
                credits: 4,
            },
        );
        assert_eq!(s.faculty_for("CS301").map(|a| a.faculty_id.as_str()), Some("F1"));
        assert!(s.faculty_for("CS999").is_none());
        assert_eq!(s.allocations.len(), 1);
    }

    #[test]
    fn test_section_deserializes_without_optional_fields() {
        let s: Section = serde_json::from_str(r#"{"id":"ECE-B","strength":45}"#).unwrap();
        assert_eq!(s.strength, 45);
        assert!(s.allocations.is_empty());
        assert!(s.home_venue.is_none());
    }
}
