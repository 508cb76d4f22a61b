//! Subject → faculty lookup.
//!
//! Capabilities resolved to a subject code at import are matched by code.
//! Unresolved capabilities name subjects the way the faculty sheet spells
//! them, which does not always match the subject sheet. Name lookup
//! normalizes away elective markers, tries an exact match, and falls back
//! to a case/whitespace-insensitive match. When the fallback hits several
//! spellings, the first one in faculty order wins.

use crate::models::{normalize_subject_name, Faculty, Subject, TeachingType};

/// A faculty member able to teach a looked-up subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub faculty_id: &'a str,
    pub faculty_name: &'a str,
    pub teaching_type: TeachingType,
    /// Listed as an elective offering.
    pub elective: bool,
}

#[derive(Debug)]
struct Entry<'a> {
    name: String,
    code: Option<&'a str>,
    candidate: Candidate<'a>,
}

/// Index of faculty capabilities by normalized subject name.
#[derive(Debug)]
pub struct FacultyDirectory<'a> {
    entries: Vec<Entry<'a>>,
}

impl<'a> FacultyDirectory<'a> {
    /// Indexes every capability, faculty ordered by ID.
    pub fn new(faculty: &'a [Faculty]) -> Self {
        let mut ordered: Vec<&Faculty> = faculty.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        let entries = ordered
            .into_iter()
            .flat_map(|f| {
                f.capabilities.iter().map(move |cap| Entry {
                    name: normalize_subject_name(&cap.subject),
                    code: cap.subject_code.as_deref(),
                    candidate: Candidate {
                        faculty_id: &f.id,
                        faculty_name: &f.name,
                        teaching_type: cap.teaching_type,
                        elective: cap.elective,
                    },
                })
            })
            .collect();

        Self { entries }
    }

    /// Faculty listed for `subject`: every capability resolved to its code,
    /// or by name when none is.
    pub fn for_subject(&self, subject: &Subject) -> Vec<Candidate<'a>> {
        let by_code: Vec<Candidate<'a>> = self
            .entries
            .iter()
            .filter(|e| e.code == Some(subject.code.as_str()))
            .map(|e| e.candidate)
            .collect();
        if by_code.is_empty() {
            self.candidates(&subject.name)
        } else {
            by_code
        }
    }

    /// Faculty listed for a subject name, among capabilities with no
    /// resolved code. Empty when nothing matches.
    pub fn candidates(&self, subject_name: &str) -> Vec<Candidate<'a>> {
        let wanted = normalize_subject_name(subject_name);
        let unresolved = || self.entries.iter().filter(|e| e.code.is_none());

        let exact: Vec<Candidate<'a>> = unresolved()
            .filter(|e| e.name == wanted)
            .map(|e| e.candidate)
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        let folded = fold(&wanted);
        let Some(spelling) = unresolved().find(|e| fold(&e.name) == folded) else {
            return Vec::new();
        };
        unresolved()
            .filter(|e| e.name == spelling.name)
            .map(|e| e.candidate)
            .collect()
    }

    /// Number of indexed capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no capability is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fold(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Capability;

    fn faculty() -> Vec<Faculty> {
        vec![
            Faculty::new("F2")
                .with_name("Dr. Iyer")
                .with_subject("Operating Systems", TeachingType::Theory),
            Faculty::new("F1")
                .with_name("Dr. Rao")
                .with_subject("Operating Systems", TeachingType::TheoryAndLab)
                .with_elective("Cloud Computing: Elective", TeachingType::Theory),
            Faculty::new("F3")
                .with_name("Dr. Sen")
                .with_subject("data  mining", TeachingType::Theory),
            Faculty::new("F4")
                .with_name("Dr. Das")
                .with_subject("Data Mining ", TeachingType::Lab),
        ]
    }

    #[test]
    fn test_exact_match_in_id_order() {
        let f = faculty();
        let dir = FacultyDirectory::new(&f);
        let c = dir.candidates("Operating Systems");
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].faculty_id, "F1");
        assert_eq!(c[1].faculty_id, "F2");
    }

    #[test]
    fn test_elective_suffix_normalized() {
        let f = faculty();
        let dir = FacultyDirectory::new(&f);
        let c = dir.candidates("Cloud Computing Elective");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].faculty_name, "Dr. Rao");
    }

    #[test]
    fn test_fallback_picks_first_spelling() {
        let f = faculty();
        let dir = FacultyDirectory::new(&f);
        // "data  mining" (F3) and "Data Mining" (F4) fold together; F3 comes first.
        let c = dir.candidates("DATA MINING");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].faculty_id, "F3");
    }

    #[test]
    fn test_unmatched_is_empty() {
        let f = faculty();
        let dir = FacultyDirectory::new(&f);
        assert!(dir.candidates("Quantum Computing").is_empty());
        assert_eq!(dir.len(), 5);
    }

    #[test]
    fn test_resolved_code_wins_over_shared_name() {
        let coded = |code: &str| Capability {
            subject: "Data Mining".into(),
            subject_code: Some(code.into()),
            teaching_type: TeachingType::Theory,
            elective: false,
        };
        let f = vec![
            Faculty::new("F1").with_capability(coded("CS301_Data Mining")),
            Faculty::new("F2").with_capability(coded("CS302")),
            Faculty::new("F3").with_subject("Data Mining", TeachingType::Theory),
        ];
        let dir = FacultyDirectory::new(&f);

        let c = dir.for_subject(&Subject::new("CS302").with_name("Data Mining"));
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].faculty_id, "F2");

        // No capability carries CS303, so only the unresolved listing matches by name.
        let c = dir.for_subject(&Subject::new("CS303").with_name("Data Mining"));
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].faculty_id, "F3");
    }
}
