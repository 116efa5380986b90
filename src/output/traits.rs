//! Result sink trait and output errors

use crate::record::DetailRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output to {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A destination for scraped records
///
/// Implementations write the whole record set in one call.
pub trait RecordSink {
    /// Writes `records` and returns the path written
    ///
    /// # Returns
    ///
    /// * `Ok(Some(path))` - Records were written to `path`
    /// * `Ok(None)` - Nothing to write; no file was created
    /// * `Err(OutputError)` - The file could not be written
    fn write(&self, records: &[DetailRecord]) -> OutputResult<Option<PathBuf>>;
}
