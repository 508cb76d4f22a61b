//! Faculty model.
//!
//! A faculty member teaches one or more subjects, each with a teaching
//! type. Faculty are read-only to the scheduling stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a subject is taught, or what a faculty member may teach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TeachingType {
    /// Lecture instruction.
    #[default]
    Theory,
    /// Laboratory instruction.
    Lab,
    /// Both lecture and lab.
    #[serde(rename = "Theory & Lab", alias = "Theory&Lab")]
    TheoryAndLab,
}

impl TeachingType {
    /// Whether a faculty capability of this type can teach a subject of `subject_type`.
    ///
    /// `Theory & Lab` faculty can teach anything; otherwise types must match.
    #[inline]
    pub fn can_teach(self, subject_type: TeachingType) -> bool {
        self == TeachingType::TheoryAndLab || self == subject_type
    }
}

impl fmt::Display for TeachingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TeachingType::Theory => "Theory",
            TeachingType::Lab => "Lab",
            TeachingType::TheoryAndLab => "Theory & Lab",
        })
    }
}

impl FromStr for TeachingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_ascii_lowercase().as_str() {
            "theory" => Ok(TeachingType::Theory),
            "lab" => Ok(TeachingType::Lab),
            "theory&lab" | "theoryandlab" => Ok(TeachingType::TheoryAndLab),
            _ => Err(format!("unknown teaching type '{s}'")),
        }
    }
}

/// One subject a faculty member can teach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Subject display name as listed for the faculty.
    pub subject: String,
    /// Resolved subject code, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    /// Teaching type for this subject.
    pub teaching_type: TeachingType,
    /// Whether this is an elective offering.
    #[serde(default)]
    pub elective: bool,
}

/// A faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Subjects this faculty member can teach.
    pub capabilities: Vec<Capability>,
}

impl Faculty {
    /// Creates a faculty member with no capabilities.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capabilities: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a regular subject capability.
    pub fn with_subject(mut self, subject: impl Into<String>, teaching_type: TeachingType) -> Self {
        self.capabilities.push(Capability {
            subject: subject.into(),
            subject_code: None,
            teaching_type,
            elective: false,
        });
        self
    }

    /// Adds an elective subject capability.
    pub fn with_elective(mut self, subject: impl Into<String>, teaching_type: TeachingType) -> Self {
        self.capabilities.push(Capability {
            subject: subject.into(),
            subject_code: None,
            teaching_type,
            elective: true,
        });
        self
    }

    /// Adds a fully specified capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faculty_builder() {
        let f = Faculty::new("F1")
            .with_name("Dr. Rao")
            .with_subject("Operating Systems", TeachingType::Theory)
            .with_elective("Machine Learning", TeachingType::TheoryAndLab);

        assert_eq!(f.id, "F1");
        assert_eq!(f.name, "Dr. Rao");
        assert_eq!(f.capabilities.len(), 2);
        assert!(!f.capabilities[0].elective);
        assert!(f.capabilities[1].elective);
    }

    #[test]
    fn test_type_compatibility() {
        assert!(TeachingType::Theory.can_teach(TeachingType::Theory));
        assert!(!TeachingType::Theory.can_teach(TeachingType::Lab));
        assert!(!TeachingType::Lab.can_teach(TeachingType::Theory));
        assert!(TeachingType::TheoryAndLab.can_teach(TeachingType::Lab));
        assert!(TeachingType::TheoryAndLab.can_teach(TeachingType::Theory));
    }

    #[test]
    fn test_teaching_type_parsing() {
        assert_eq!("Theory".parse(), Ok(TeachingType::Theory));
        assert_eq!(" lab ".parse(), Ok(TeachingType::Lab));
        assert_eq!("Theory & Lab".parse(), Ok(TeachingType::TheoryAndLab));
        assert_eq!("Theory&Lab".parse(), Ok(TeachingType::TheoryAndLab));
        assert!("Seminar".parse::<TeachingType>().is_err());
    }

    #[test]
    fn test_teaching_type_serde() {
        let json = serde_json::to_string(&TeachingType::TheoryAndLab).unwrap();
        assert_eq!(json, "\"Theory & Lab\"");
        let alias: TeachingType = serde_json::from_str("\"Theory&Lab\"").unwrap();
        assert_eq!(alias, TeachingType::TheoryAndLab);
    }
}
