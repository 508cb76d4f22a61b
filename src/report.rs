//! Section timetable sheets.
//!
//! One sheet per section: the week grid (a row per day, a column per
//! period) followed by the faculty assigned to each subject.
//!
//! | Cell | Rendered as |
//! |------|-------------|
//! | free | blank |
//! | lunch | `Lunch` |
//! | elective block | `Elective` |
//! | regular | `{subject} ({venue})` |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::models::{Faculty, Period, PeriodKey, PeriodKind, Section};

/// Longest sheet name spreadsheet tools accept.
pub const MAX_SHEET_NAME: usize = 31;

/// Blank rows between the grid and the faculty table.
const TABLE_GAP: usize = 3;

/// Rendered sheet of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSheet {
    /// Section ID, truncated to [`MAX_SHEET_NAME`] characters.
    pub name: String,
    /// `Day` followed by one `HH:MM-HH:MM` column per period.
    pub header: Vec<String>,
    /// One row per day: day name, then one cell per period.
    pub rows: Vec<Vec<String>>,
    /// (faculty name, subject code), regular subjects first.
    pub faculty: Vec<(String, String)>,
}

impl SectionSheet {
    /// Renders a section. Faculty names come from `faculty` by ID;
    /// unknown IDs show as `Unassigned`.
    pub fn render(section: &Section, faculty: &[Faculty]) -> Self {
        let names: BTreeMap<&str, &str> = faculty
            .iter()
            .map(|f| (f.id.as_str(), f.name.as_str()))
            .collect();

        // Columns come from the first day; every day shares the skeleton.
        let columns: Vec<(PeriodKey, String)> = section
            .timetable
            .days()
            .next()
            .and_then(|day| section.timetable.day(day))
            .map(|periods| {
                periods
                    .iter()
                    .map(|(&key, p)| (key, p.slot.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push("Day".to_string());
        header.extend(columns.iter().map(|(_, label)| label.clone()));

        let rows = section
            .timetable
            .days()
            .map(|day| {
                let mut row = vec![day.to_string()];
                row.extend(columns.iter().map(|(key, _)| {
                    section
                        .timetable
                        .get(day, *key)
                        .map(cell)
                        .unwrap_or_default()
                }));
                row
            })
            .collect();

        let allocations = &section.allocations;
        let faculty = allocations
            .regular
            .iter()
            .chain(&allocations.elective)
            .map(|(code, allocation)| {
                let name = names
                    .get(allocation.faculty_id.as_str())
                    .copied()
                    .unwrap_or("Unassigned");
                (name.to_string(), code.clone())
            })
            .collect();

        Self {
            name: section.id.chars().take(MAX_SHEET_NAME).collect(),
            header,
            rows,
            faculty,
        }
    }

    /// Every line of the sheet as cells, tables separated by blank lines.
    pub fn lines(&self) -> Vec<Vec<String>> {
        let mut lines = Vec::with_capacity(self.rows.len() + self.faculty.len() + TABLE_GAP + 2);
        lines.push(self.header.clone());
        lines.extend(self.rows.iter().cloned());
        lines.extend(std::iter::repeat_with(Vec::new).take(TABLE_GAP));
        lines.push(vec!["Faculty".to_string(), "Subject".to_string()]);
        lines.extend(
            self.faculty
                .iter()
                .map(|(name, code)| vec![name.clone(), code.clone()]),
        );
        lines
    }

    /// Column widths: longest cell in the column plus 2.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for line in self.lines() {
            for (i, value) in line.iter().enumerate() {
                let len = value.chars().count();
                if i == widths.len() {
                    widths.push(0);
                }
                widths[i] = widths[i].max(len);
            }
        }
        widths.into_iter().map(|w| w + 2).collect()
    }

    /// Comma-separated text.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            let fields: Vec<String> = line.iter().map(|v| csv_field(v)).collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }

    /// Aligned plain text using [`column_widths`](Self::column_widths).
    pub fn to_text(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", self.name);
        for line in self.lines() {
            let mut text = String::new();
            for (value, width) in line.iter().zip(&widths) {
                let _ = write!(text, "{value:<width$}");
            }
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Renders every section, in the given order.
pub fn render_all(sections: &[Section], faculty: &[Faculty]) -> Vec<SectionSheet> {
    sections
        .iter()
        .map(|s| SectionSheet::render(s, faculty))
        .collect()
}

fn cell(period: &Period) -> String {
    match &period.kind {
        PeriodKind::Empty => String::new(),
        PeriodKind::Lunch => "Lunch".to_string(),
        PeriodKind::Elective => "Elective".to_string(),
        PeriodKind::Regular { subject, venue, .. } => format!("{subject} ({venue})"),
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allocation, Day, TeachingType, TimeSlot};

    fn section() -> Section {
        let mut s = Section::new("CSE-A", 40);
        for day in [Day::Monday, Day::Tuesday] {
            s.timetable.insert(
                day,
                PeriodKey(1),
                Period::empty(TimeSlot::parse("09:00", "10:00").unwrap()),
            );
            s.timetable.insert(
                day,
                PeriodKey(2),
                Period::empty(TimeSlot::parse("10:00", "11:00").unwrap()),
            );
        }
        if let Some(p) = s.timetable.get_mut(Day::Monday, PeriodKey(1)) {
            p.kind = PeriodKind::Regular {
                subject: "CS1".into(),
                venue: "R1".into(),
                faculty: Some("F1".into()),
            };
        }
        if let Some(p) = s.timetable.get_mut(Day::Monday, PeriodKey(2)) {
            p.kind = PeriodKind::Lunch;
        }
        if let Some(p) = s.timetable.get_mut(Day::Tuesday, PeriodKey(2)) {
            p.kind = PeriodKind::Elective;
        }

        let allocation = |id: &str| Allocation {
            faculty_id: id.into(),
            faculty_name: String::new(),
            subject_name: String::new(),
            teaching_type: TeachingType::Theory,
            credits: 3,
        };
        s.allocations.regular.insert("CS1".into(), allocation("F1"));
        s.allocations.elective.insert("EL1".into(), allocation("F9"));
        s
    }

    #[test]
    fn test_render_grid() {
        let sheet = SectionSheet::render(&section(), &[Faculty::new("F1").with_name("Dr. Rao")]);

        assert_eq!(sheet.header, vec!["Day", "09:00-10:00", "10:00-11:00"]);
        assert_eq!(sheet.rows[0], vec!["Monday", "CS1 (R1)", "Lunch"]);
        assert_eq!(sheet.rows[1], vec!["Tuesday", "", "Elective"]);
        assert_eq!(
            sheet.faculty,
            vec![
                ("Dr. Rao".to_string(), "CS1".to_string()),
                ("Unassigned".to_string(), "EL1".to_string()),
            ]
        );
    }

    #[test]
    fn test_column_widths_cover_both_tables() {
        let sheet = SectionSheet::render(&section(), &[]);
        let widths = sheet.column_widths();
        // "Unassigned" is the longest first-column value.
        assert_eq!(widths[0], "Unassigned".len() + 2);
        assert_eq!(widths[1], "09:00-10:00".len() + 2);
    }

    #[test]
    fn test_sheet_name_truncated() {
        let mut s = section();
        s.id = "X".repeat(40);
        assert_eq!(SectionSheet::render(&s, &[]).name.len(), MAX_SHEET_NAME);
    }

    #[test]
    fn test_csv_layout() {
        let mut s = section();
        if let Some(p) = s.timetable.get_mut(Day::Tuesday, PeriodKey(1)) {
            p.kind = PeriodKind::Regular {
                subject: "CS2".into(),
                venue: "Hall 1, East".into(),
                faculty: None,
            };
        }
        let csv = SectionSheet::render(&s, &[]).to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Day,09:00-10:00,10:00-11:00");
        assert_eq!(lines[2], "Tuesday,\"CS2 (Hall 1, East)\",Elective");
        assert_eq!(lines[3], "");
        assert_eq!(lines[6], "Faculty,Subject");
        assert_eq!(lines[7], "Unassigned,CS1");
    }

    #[test]
    fn test_empty_timetable() {
        let sheet = SectionSheet::render(&Section::new("B", 10), &[]);
        assert_eq!(sheet.header, vec!["Day"]);
        assert!(sheet.rows.is_empty());
        assert!(sheet.to_text().starts_with("== B =="));
    }
}
