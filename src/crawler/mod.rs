//! Crawler module for listing traversal and detail fetching
//!
//! This module contains the core scraping logic, including:
//! - The request context: shared HTTP client and global request limiter
//! - HTML field extraction for listing and detail pages
//! - Phone number recovery through the AJAX endpoint
//! - Bounded-concurrency batch fetching of detail pages
//! - The pagination controller with end-of-data detection

mod batch;
mod coordinator;
mod fetcher;
mod parser;
mod phone;

pub use batch::BatchFetcher;
pub use coordinator::{run_scrape, Paginator, TraversalOutcome};
pub use fetcher::{build_http_client, FetchError, RequestStats, ScrapeContext};
pub use parser::{clean_label, ExtractedDetail, FieldExtractor, MasinlarExtractor};
pub use phone::{parse_phone_response, PhoneCredential, PhoneResolver};
