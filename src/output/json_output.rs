//! JSON export

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::DetailRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Writes all records as one pretty-printed JSON array
///
/// Text is written as UTF-8; Azerbaijani characters are not escaped.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for JsonSink {
    fn write(&self, records: &[DetailRecord]) -> OutputResult<Option<PathBuf>> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(Some(self.path.clone()))
    }
}
