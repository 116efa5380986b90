//! Run summary
//!
//! Condenses a finished traversal into the figures printed at the end of a
//! run: how much was collected, how fast, and why the run stopped.

use crate::crawler::TraversalOutcome;
use crate::record::DetailRecord;
use crate::state::StopReason;
use std::time::Duration;

/// Figures describing one completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_records: usize,

    /// Records that carry a resolved phone number
    pub records_with_phone: usize,

    /// Listing pages requested
    pub pages_visited: u32,

    pub stop_reason: StopReason,

    pub elapsed: Duration,

    /// HTTP requests made, including phone lookups
    pub requests: u64,

    /// Requests that ended in an error
    pub failed_requests: u64,

    /// Highest number of requests observed in flight at once
    pub peak_in_flight: usize,
}

impl RunSummary {
    pub fn from_outcome(outcome: &TraversalOutcome) -> Self {
        Self {
            total_records: outcome.records.len(),
            records_with_phone: outcome
                .records
                .iter()
                .filter(|record| record.phone().is_some())
                .count(),
            pages_visited: outcome.pages_fetched,
            stop_reason: outcome.stop_reason,
            elapsed: outcome.elapsed,
            requests: outcome.stats.requests,
            failed_requests: outcome.stats.failures,
            peak_in_flight: outcome.stats.peak_in_flight,
        }
    }

    /// Share of records with a phone, as a percentage
    pub fn phone_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        (self.records_with_phone as f64 / self.total_records as f64) * 100.0
    }

    /// How the traversal ended, for the operator
    pub fn completion(&self) -> &'static str {
        if self.stop_reason.is_end_of_data() {
            "end of listings reached"
        } else {
            "cut off by a page bound; more listings may remain"
        }
    }

    /// Records collected per second of wall time
    pub fn records_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.total_records as f64 / secs
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Scrape Summary ===\n");

    println!("Records:");
    println!("  Total records: {}", summary.total_records);
    println!(
        "  With phone number: {} ({:.1}%)",
        summary.records_with_phone,
        summary.phone_rate()
    );
    println!();

    println!("Traversal:");
    println!("  Listing pages visited: {}", summary.pages_visited);
    println!("  Stopped because: {}", summary.stop_reason.describe());
    println!("  Completion: {}", summary.completion());
    println!(
        "  Elapsed: {:.2}s ({:.2} records/second)",
        summary.elapsed.as_secs_f64(),
        summary.records_per_second()
    );
    println!();

    println!("Requests:");
    println!("  Total: {}", summary.requests);
    println!("  Failed: {}", summary.failed_requests);
    println!("  Peak in flight: {}", summary.peak_in_flight);
}

/// Prints the headline fields of one record
pub fn print_sample(record: &DetailRecord) {
    println!("\nSample record:");
    for (label, key) in [
        ("Title", "title"),
        ("Price", "price"),
        ("Phone", "phone"),
        ("Brand", "brand"),
    ] {
        println!("  {}: {}", label, record.text(key).unwrap_or("N/A"));
    }
}
