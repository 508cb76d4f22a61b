//! Timetable generator binary.
//!
//! # Usage
//!
//! ```bash
//! u-timetable [--csv] <config.toml> <feeds.json> [snapshot.json]
//! ```
//!
//! Imports the feeds into an in-memory store, runs the pipeline for the
//! configured institute, prints every section sheet (aligned text, or CSV
//! with `--csv`) and the run report, and writes the store snapshot when a
//! path is given.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (default: info)

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use u_timetable::config::RunConfig;
use u_timetable::error::TimetableError;
use u_timetable::import::{import, Feeds};
use u_timetable::pipeline::Pipeline;
use u_timetable::report::render_all;
use u_timetable::store::{EntityStore, MemoryStore};

const USAGE: &str = "usage: u-timetable [--csv] <config.toml> <feeds.json> [snapshot.json]";

/// Sheet output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Csv,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let (flags, args): (Vec<OsString>, Vec<OsString>) = std::env::args_os()
        .skip(1)
        .partition(|a| a.to_string_lossy().starts_with("--"));
    let format = match flags.as_slice() {
        [] => Format::Text,
        [flag] if flag.as_os_str() == "--csv" => Format::Csv,
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    let args: Vec<PathBuf> = args.into_iter().map(PathBuf::from).collect();
    let (config, feeds, snapshot) = match args.as_slice() {
        [config, feeds] => (config, feeds, None),
        [config, feeds, snapshot] => (config, feeds, Some(snapshot)),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(config, feeds, snapshot.map(PathBuf::as_path), format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(
    config: &Path,
    feeds: &Path,
    snapshot: Option<&Path>,
    format: Format,
) -> Result<(), TimetableError> {
    let config = RunConfig::load(config)?;
    config.params.validate()?;
    let institute = config.params.institute.clone();

    let json = std::fs::read_to_string(feeds)
        .map_err(|e| TimetableError::Config(format!("{}: {e}", feeds.display())))?;
    let store = MemoryStore::new();
    let summary = import(&store, &institute, Feeds::from_json(&json)?, false)?;
    info!(
        faculty = summary.faculty,
        sections = summary.sections,
        "feeds imported"
    );

    let report = Pipeline::from_config(&store, config).run()?;

    let faculty = store.faculty(&institute)?;
    for sheet in render_all(&store.sections(&institute)?, &faculty) {
        match format {
            Format::Text => println!("{}", sheet.to_text()),
            Format::Csv => println!("# {}\n{}", sheet.name, sheet.to_csv()),
        }
    }
    print!("{report}");

    if let Some(path) = snapshot {
        store.save(path)?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}
