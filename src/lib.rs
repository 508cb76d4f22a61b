//! Weekly class timetabling for universities.
//!
//! Takes an institute's faculty, subjects, sections, and venues and builds
//! one weekly timetable per section: faculty allocated per subject, a lunch
//! period per day, a shared elective block, theory periods placed into
//! venues, and venue clashes repaired.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Faculty`, `Subject`, `Section`, `Venue`,
//!   `Period`, `Timetable`
//! - **`slots`**: Daily class/break interval generation
//! - **`allocation`**: Faculty-to-subject assignment under load limits
//! - **`scheduler`**: Placement stages (skeleton, lunch, electives, theory)
//! - **`clash`**: Double-booking and over-capacity detection and repair
//! - **`store`**: Institute-scoped entity storage with batched commits
//! - **`import`**: Tabular source feeds to entities
//! - **`pipeline`**: Stage orchestration and the run report
//! - **`report`**: Per-section timetable sheets
//! - **`config`**, **`validation`**, **`error`**, **`outcome`**: Run
//!   parameters, input checks, fatal errors, per-item failures
//!
//! # Example
//!
//! ```
//! use u_timetable::config::TimetableParams;
//! use u_timetable::models::parse_hhmm;
//! use u_timetable::slots::class_slots;
//!
//! let params = TimetableParams::new("iiit", parse_hhmm("09:00").unwrap(), parse_hhmm("12:00").unwrap());
//! assert_eq!(class_slots(&params.slot_params()).len(), 3);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

pub mod allocation;
pub mod clash;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod outcome;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod slots;
pub mod store;
pub mod validation;
