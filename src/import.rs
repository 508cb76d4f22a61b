//! Source data import.
//!
//! Converts the four tabular feeds (faculty, subjects, sections, venues)
//! into entities and stores them for an institute. Column names follow the
//! source workbook, so a sheet exported row-by-row to JSON deserializes
//! directly:
//!
//! ```json
//! {
//!   "Faculty":  [{ "ID": "F1", "Name": "Dr. Rao", "Subject": "OS, Cloud: Elective", "Type": "Theory, Theory" }],
//!   "Subjects": [{ "Subject": "OS", "Subject Code": "CS201", "Type": "Theory", "Credits": 3 }],
//!   "Sections": [{ "Section": "CSE-A", "Strength": 60 }],
//!   "Venues":   [{ "Classroom/Lab": "R101", "Capacity": 60 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::error::TimetableError;
use crate::models::{Capability, Faculty, Section, Subject, TeachingType, Venue, VenueKind};
use crate::store::{EntityStore, WriteSet};
use crate::validation::{validate_entities, ValidationError, ValidationErrorKind};

/// Characters not allowed in storage keys.
const RESERVED_KEY_CHARS: [char; 7] = ['.', '$', '#', '[', ']', '/', ':'];

/// Trims and replaces reserved key characters with `_`.
pub fn sanitize_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if RESERVED_KEY_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Faculty feed row. Subjects and types are comma-joined and paired by
/// position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacultyRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Subject")]
    pub subjects: String,
    #[serde(rename = "Type", default)]
    pub types: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRow {
    #[serde(rename = "Subject")]
    pub name: String,
    #[serde(rename = "Subject Code")]
    pub code: String,
    #[serde(rename = "Type")]
    pub teaching_type: String,
    #[serde(rename = "Credits")]
    pub credits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRow {
    #[serde(rename = "Section")]
    pub section: String,
    #[serde(rename = "Strength")]
    pub strength: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueRow {
    #[serde(rename = "Classroom/Lab")]
    pub name: String,
    #[serde(rename = "Capacity")]
    pub capacity: u32,
}

/// The four source feeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feeds {
    #[serde(rename = "Faculty")]
    pub faculty: Vec<FacultyRow>,
    #[serde(rename = "Subjects")]
    pub subjects: Vec<SubjectRow>,
    #[serde(rename = "Sections")]
    pub sections: Vec<SectionRow>,
    #[serde(rename = "Venues")]
    pub venues: Vec<VenueRow>,
}

/// Entities built from the feeds.
#[derive(Debug, Clone, Default)]
pub struct Imported {
    pub faculty: Vec<Faculty>,
    pub subjects: Vec<Subject>,
    pub sections: Vec<Section>,
    pub venues: Vec<Venue>,
    /// Faculty subjects that matched no subject row, as `ID: subject`.
    pub skipped: Vec<String>,
}

/// Counts reported after an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub faculty: usize,
    pub subjects: usize,
    pub sections: usize,
    pub venues: usize,
    pub skipped: Vec<String>,
}

impl Feeds {
    /// Parses feeds from JSON. A missing sheet or column is a validation error.
    pub fn from_json(json: &str) -> Result<Self, TimetableError> {
        serde_json::from_str(json).map_err(|e| {
            TimetableError::Validation(vec![ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("Import feeds: {e}"),
            )])
        })
    }

    /// Converts rows into entities.
    ///
    /// Reports every unparseable type and every structural problem
    /// (duplicate IDs, zero sizes) together.
    pub fn into_entities(self) -> Result<Imported, TimetableError> {
        let mut errors = Vec::new();
        let mut imported = Imported::default();

        // Subject names in row order, for faculty matching.
        let mut by_name: Vec<(String, String)> = Vec::with_capacity(self.subjects.len());
        let mut code_counts: HashMap<String, usize> = HashMap::new();
        for row in &self.subjects {
            *code_counts.entry(sanitize_key(&row.code)).or_default() += 1;
        }

        for row in &self.subjects {
            let code = sanitize_key(&row.code);
            let name = row.name.trim().to_string();
            let teaching_type = match row.teaching_type.parse::<TeachingType>() {
                Ok(t) => t,
                Err(e) => {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidValue,
                        format!("Subject '{name}': {e}"),
                    ));
                    continue;
                }
            };
            let key = if code_counts.get(&code).copied().unwrap_or(0) > 1 {
                format!("{code}_{}", sanitize_key(&name))
            } else {
                code
            };
            by_name.push((name.clone(), key.clone()));

            let mut subject = Subject::new(key)
                .with_name(name.clone())
                .with_type(teaching_type)
                .with_credits(row.credits);
            if name.to_lowercase().contains("elective") {
                subject = subject.elective();
            }
            imported.subjects.push(subject);
        }

        let mut faculty: BTreeMap<String, Faculty> = BTreeMap::new();
        for row in &self.faculty {
            let id = sanitize_key(&row.id);
            let entry = faculty
                .entry(id.clone())
                .or_insert_with(|| Faculty::new(id.clone()).with_name(row.name.trim()));

            let types: Vec<&str> = row.types.split(',').map(str::trim).collect();
            for (i, raw) in row.subjects.split(',').map(str::trim).enumerate() {
                if raw.is_empty() {
                    continue;
                }
                let teaching_type = match types.get(i).filter(|t| !t.is_empty()) {
                    None => TeachingType::Theory,
                    Some(t) => match t.parse::<TeachingType>() {
                        Ok(t) => t,
                        Err(e) => {
                            errors.push(ValidationError::new(
                                ValidationErrorKind::InvalidValue,
                                format!("Faculty '{id}': {e}"),
                            ));
                            continue;
                        }
                    },
                };

                let Some(code) = match_subject_code(raw, &by_name) else {
                    warn!(faculty = %id, subject = raw, "no subject code for faculty subject");
                    imported.skipped.push(format!("{id}: {raw}"));
                    continue;
                };
                let elective = raw.contains("Elective")
                    || imported.subjects.iter().any(|s| s.code == code && s.elective);
                entry.capabilities.push(Capability {
                    subject: raw.to_string(),
                    subject_code: Some(code),
                    teaching_type,
                    elective,
                });
            }
        }
        imported.faculty = faculty.into_values().collect();

        imported.sections = self
            .sections
            .iter()
            .map(|row| Section::new(sanitize_key(&row.section), row.strength))
            .collect();

        imported.venues = self
            .venues
            .iter()
            .filter(|row| !row.name.trim().is_empty())
            .map(|row| {
                let kind = if row.name.contains("Lab") {
                    VenueKind::Lab
                } else {
                    VenueKind::Classroom
                };
                Venue::new(sanitize_key(&row.name), row.capacity, kind)
            })
            .collect();

        if let Err(structural) = validate_entities(
            &imported.faculty,
            &imported.subjects,
            &imported.sections,
            &imported.venues,
        ) {
            errors.extend(structural);
        }
        if errors.is_empty() {
            Ok(imported)
        } else {
            Err(TimetableError::Validation(errors))
        }
    }
}

/// Code of the subject a faculty listing refers to: exact normalized name
/// first, then case-insensitive, first match in row order.
fn match_subject_code(listed: &str, by_name: &[(String, String)]) -> Option<String> {
    let wanted = crate::models::normalize_subject_name(listed);
    by_name
        .iter()
        .find(|(name, _)| *name == wanted)
        .or_else(|| {
            let lower = wanted.to_lowercase();
            by_name
                .iter()
                .find(|(name, _)| crate::models::normalize_subject_name(name).to_lowercase() == lower)
        })
        .map(|(_, code)| code.clone())
}

/// Stores imported feeds for `institute`.
///
/// Refuses an institute that already has faculty unless `overwrite` is set,
/// in which case the institute is replaced wholesale.
pub fn import<S: EntityStore + ?Sized>(
    store: &S,
    institute: &str,
    feeds: Feeds,
    overwrite: bool,
) -> Result<ImportSummary, TimetableError> {
    if !overwrite && !store.faculty(institute)?.is_empty() {
        return Err(TimetableError::DataIntegrity(format!(
            "institute '{institute}' already imported"
        )));
    }

    let imported = feeds.into_entities()?;
    let summary = ImportSummary {
        faculty: imported.faculty.len(),
        subjects: imported.subjects.len(),
        sections: imported.sections.len(),
        venues: imported.venues.len(),
        skipped: imported.skipped,
    };
    store.commit(
        institute,
        WriteSet::new()
            .replacing()
            .with_faculty(imported.faculty)
            .with_subjects(imported.subjects)
            .with_sections(imported.sections)
            .with_venues(imported.venues),
    )?;

    info!(
        institute,
        faculty = summary.faculty,
        subjects = summary.subjects,
        sections = summary.sections,
        venues = summary.venues,
        skipped = summary.skipped.len(),
        "import complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const FEEDS: &str = r#"{
        "Faculty": [
            { "ID": "F.1", "Name": " Dr. Rao ", "Subject": "Operating Systems, Cloud Computing: Elective", "Type": "Theory & Lab" },
            { "ID": "F2", "Name": "Dr. Iyer", "Subject": "operating systems, Quantum Basics" },
            { "ID": "F.1", "Name": "Dr. Rao", "Subject": "Data Mining", "Type": "Lab" }
        ],
        "Subjects": [
            { "Subject": "Operating Systems", "Subject Code": "CS.201", "Type": "Theory", "Credits": 3 },
            { "Subject": "Data Mining", "Subject Code": "CS301", "Type": "Lab", "Credits": 2 },
            { "Subject": "Data Mining Lab", "Subject Code": "CS301", "Type": "Lab", "Credits": 1 },
            { "Subject": "Cloud Computing Elective", "Subject Code": "EL1", "Type": "Theory", "Credits": 3 }
        ],
        "Sections": [
            { "Section": "CSE/A", "Strength": 60 },
            { "Section": "CSE-B", "Strength": 55 }
        ],
        "Venues": [
            { "Classroom/Lab": "R101", "Capacity": 60 },
            { "Classroom/Lab": "CS Lab 1", "Capacity": 30 },
            { "Classroom/Lab": "  ", "Capacity": 10 }
        ]
    }"#;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key(" CSE/A.1 "), "CSE_A_1");
        assert_eq!(sanitize_key("a$b#c[d]e:f"), "a_b_c_d_e_f");
    }

    #[test]
    fn test_into_entities() {
        let imported = Feeds::from_json(FEEDS).unwrap().into_entities().unwrap();

        let codes: Vec<&str> = imported.subjects.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["CS_201", "CS301_Data Mining", "CS301_Data Mining Lab", "EL1"]);
        assert!(imported.subjects[3].elective);
        assert!(!imported.subjects[0].elective);

        // Rows with the same ID merge.
        assert_eq!(imported.faculty.len(), 2);
        let rao = imported.faculty.iter().find(|f| f.id == "F_1").unwrap();
        assert_eq!(rao.name, "Dr. Rao");
        assert_eq!(rao.capabilities.len(), 3);
        assert_eq!(rao.capabilities[0].teaching_type, TeachingType::TheoryAndLab);
        assert_eq!(rao.capabilities[1].subject_code.as_deref(), Some("EL1"));
        assert!(rao.capabilities[1].elective);
        assert_eq!(rao.capabilities[2].subject_code.as_deref(), Some("CS301_Data Mining"));
        // Missing type falls back to Theory; case-insensitive match.
        let iyer = imported.faculty.iter().find(|f| f.id == "F2").unwrap();
        assert_eq!(iyer.capabilities.len(), 1);
        assert_eq!(iyer.capabilities[0].teaching_type, TeachingType::Theory);
        assert_eq!(iyer.capabilities[0].subject_code.as_deref(), Some("CS_201"));
        assert_eq!(imported.skipped, vec!["F2: Quantum Basics"]);

        assert_eq!(imported.sections[0].id, "CSE_A");
        assert_eq!(imported.venues.len(), 2);
        assert_eq!(imported.venues[1].kind, VenueKind::Lab);
    }

    #[test]
    fn test_missing_sheet() {
        let err = Feeds::from_json(r#"{ "Faculty": [] }"#).unwrap_err();
        match err {
            TimetableError::Validation(errors) => {
                assert_eq!(errors[0].kind, ValidationErrorKind::MissingField);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_types_collected() {
        let mut feeds = Feeds::from_json(FEEDS).unwrap();
        feeds.subjects[0].teaching_type = "Seminar".into();
        feeds.faculty[2].types = "Workshop".into();
        match feeds.into_entities() {
            Err(TimetableError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_import_refuses_existing_institute() {
        let store = MemoryStore::new();
        let summary = import(&store, "iiit", Feeds::from_json(FEEDS).unwrap(), false).unwrap();
        assert_eq!(summary.sections, 2);
        assert_eq!(store.venues("iiit").unwrap().len(), 2);

        let again = import(&store, "iiit", Feeds::from_json(FEEDS).unwrap(), false);
        assert!(matches!(again, Err(TimetableError::DataIntegrity(_))));

        let mut feeds = Feeds::from_json(FEEDS).unwrap();
        feeds.sections.truncate(1);
        import(&store, "iiit", feeds, true).unwrap();
        assert_eq!(store.sections("iiit").unwrap().len(), 1);
    }
}
