//! CSV export
//!
//! Records do not share a fixed schema, so the header is the sorted union of
//! every record's keys and missing fields are written as empty cells.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::DetailRecord;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Writes records as one CSV row each
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for CsvSink {
    fn write(&self, records: &[DetailRecord]) -> OutputResult<Option<PathBuf>> {
        if records.is_empty() {
            tracing::warn!("No records to save, skipping {}", self.path.display());
            return Ok(None);
        }

        let header = header_for(records);
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(&header)?;

        for record in records {
            let row = header.iter().map(|key| {
                record
                    .get(key)
                    .map(|value| value.to_cell())
                    .unwrap_or_default()
            });
            writer.write_record(row)?;
        }
        writer.flush()?;

        tracing::info!("Saved {} records to {}", records.len(), self.path.display());
        Ok(Some(self.path.clone()))
    }
}

/// Sorted union of field names across all records
pub fn header_for(records: &[DetailRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
