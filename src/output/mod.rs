//! Output module for persisting scraped records
//!
//! This module handles:
//! - Writing records to CSV and JSON files
//! - Naming output files with a run timestamp
//! - Summarising a finished run

mod csv_output;
mod json_output;
pub mod stats;
mod traits;

pub use csv_output::{header_for, CsvSink};
pub use json_output::JsonSink;
pub use stats::{print_sample, print_summary, RunSummary};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::{OutputConfig, OutputFormat};
use crate::record::DetailRecord;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Timestamp layout used in default file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Builds `{dir}/{stem}_{YYYYmmdd_HHMMSS}.{ext}`
pub fn timestamped_path(
    dir: &Path,
    stem: &str,
    format: OutputFormat,
    at: &DateTime<Local>,
) -> PathBuf {
    dir.join(format!(
        "{}_{}.{}",
        stem,
        at.format(TIMESTAMP_FORMAT),
        format.extension()
    ))
}

/// Creates the sink for one output format
pub fn sink_for(format: OutputFormat, path: PathBuf) -> Box<dyn RecordSink> {
    match format {
        OutputFormat::Csv => Box::new(CsvSink::new(path)),
        OutputFormat::Json => Box::new(JsonSink::new(path)),
    }
}

/// Writes `records` in every configured format
///
/// All files of one run share the same timestamp. The output directory is
/// created if missing.
///
/// # Returns
///
/// * `Ok(paths)` - Files that were actually written
/// * `Err(OutputError)` - A file could not be written
pub fn write_records(
    config: &OutputConfig,
    records: &[DetailRecord],
) -> OutputResult<Vec<PathBuf>> {
    let dir = Path::new(&config.directory);
    std::fs::create_dir_all(dir).map_err(|e| OutputError::Write {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let now = Local::now();
    let mut written = Vec::new();
    for &format in &config.formats {
        let path = timestamped_path(dir, &config.file_stem, format, &now);
        if let Some(path) = sink_for(format, path).write(records)? {
            written.push(path);
        }
    }

    Ok(written)
}
