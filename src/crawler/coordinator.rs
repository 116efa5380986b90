//! Pagination controller - main traversal logic
//!
//! This module walks the listing index one page at a time:
//! - builds each page's URL from the start offset and page size
//! - extracts the page's detail URLs
//! - lets [`TraversalState`] decide whether to skip, stop, or dispatch
//! - hands unseen URLs to the [`BatchFetcher`] and collects its records
//!
//! The site never says which page is the last one; once its index is
//! exhausted it starts serving page 1 again. Three independent signals are
//! therefore layered: a streak of empty pages, a late page repeating page 1's
//! leading listings, and a page made up mostly of listings already seen.

use crate::config::{validate, Config};
use crate::crawler::batch::BatchFetcher;
use crate::crawler::fetcher::{RequestStats, ScrapeContext};
use crate::crawler::parser::{FieldExtractor, MasinlarExtractor};
use crate::record::DetailRecord;
use crate::state::{PageDecision, StopReason, TraversalState};
use crate::url::{listing_offset, listing_url};
use crate::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a finished traversal produced
#[derive(Debug, Clone)]
pub struct TraversalOutcome {
    /// Records in the order their batches completed
    pub records: Vec<DetailRecord>,

    /// Which stop condition ended the run
    pub stop_reason: StopReason,

    /// Listing pages actually requested
    pub pages_fetched: u32,

    /// Request counters for the whole run
    pub stats: RequestStats,

    pub elapsed: Duration,
}

/// Drives one traversal of a site's listing index
pub struct Paginator {
    ctx: Arc<ScrapeContext>,
    extractor: Arc<dyn FieldExtractor>,
    batch: BatchFetcher,
    listing_path: String,
    start_offset: u32,
    state: TraversalState,
}

impl Paginator {
    /// Creates a paginator for a masinlar.az-style site
    ///
    /// # Returns
    ///
    /// * `Ok(Paginator)` - Client and limiter built
    /// * `Err(ScrapeError)` - Invalid base URL or client construction failed
    pub fn new(config: &Config) -> Result<Self> {
        let ctx = Arc::new(ScrapeContext::new(config)?);
        Ok(Self::with_parts(ctx, Arc::new(MasinlarExtractor::new()), config))
    }

    /// Creates a paginator from an existing context and extractor
    pub fn with_parts(
        ctx: Arc<ScrapeContext>,
        extractor: Arc<dyn FieldExtractor>,
        config: &Config,
    ) -> Self {
        let batch = BatchFetcher::new(Arc::clone(&ctx), Arc::clone(&extractor));
        Self {
            ctx,
            extractor,
            batch,
            listing_path: config.site.listing_path.clone(),
            start_offset: config.site.start_offset,
            state: TraversalState::new(config.pagination.clone()),
        }
    }

    /// Runs the traversal until one of the stop conditions fires
    ///
    /// Never fails: listing and detail failures are absorbed as empty pages
    /// and missing records, and whatever was gathered is returned.
    pub async fn run(mut self) -> TraversalOutcome {
        let started = Instant::now();
        let mut records = Vec::new();
        let mut pages_fetched = 0;

        let page_delay = Duration::from_millis(self.state.limits().page_delay_ms);
        let empty_page_delay = Duration::from_millis(self.state.limits().empty_page_delay_ms);

        let stop_reason = loop {
            if let Some(reason) = self.state.check_bounds() {
                match reason {
                    StopReason::SafetyCeiling => tracing::warn!(
                        "Reached safety limit of {} pages. Stopping.",
                        self.state.limits().safety_ceiling
                    ),
                    _ => tracing::info!(
                        "Reached max_pages limit: {}",
                        self.state.limits().max_pages.unwrap_or_default()
                    ),
                }
                break reason;
            }

            let page = self.state.current_page();
            let offset = listing_offset(self.start_offset, page, self.state.limits().page_size);
            let url = listing_url(self.ctx.base_url(), &self.listing_path, offset);

            tracing::info!(
                "Scraping page {}: start={} (Total records so far: {})",
                page,
                offset,
                records.len()
            );

            let links = self.fetch_listing(&url).await;
            pages_fetched += 1;
            let found = links.len();

            match self.state.evaluate(links) {
                PageDecision::SkipEmpty { consecutive } => {
                    tracing::warn!(
                        "No listings found on page {} (URL: {}). Empty pages: {}",
                        page,
                        url,
                        consecutive
                    );
                    self.state.advance();
                    pause(empty_page_delay).await;
                }

                PageDecision::Stop(reason) => {
                    match reason {
                        StopReason::EmptyPages => tracing::info!(
                            "Found {} consecutive empty pages. Reached end of listings.",
                            self.state.consecutive_empty()
                        ),
                        StopReason::LoopDetected => tracing::info!(
                            "Pagination loop detected at page {}: same listings as page 1",
                            page
                        ),
                        _ => tracing::info!(
                            "High duplicate rate at page {} ({} listings): likely reached end",
                            page,
                            found
                        ),
                    }
                    break reason;
                }

                PageDecision::Dispatch { urls, duplicates } => {
                    tracing::info!(
                        "Found {} listing URLs on page {} ({} already seen)",
                        found,
                        page,
                        duplicates
                    );

                    if urls.is_empty() {
                        tracing::info!("Page {}: all URLs already seen, skipping", page);
                    } else {
                        let batch = self.batch.fetch_all(urls).await;
                        let scraped = batch.len();
                        self.state.record_batch(scraped);
                        records.extend(batch);
                        tracing::info!(
                            "Page {}: scraped {} new records (Total: {})",
                            page,
                            scraped,
                            self.state.record_count()
                        );
                    }

                    self.state.advance();
                    pause(page_delay).await;
                }
            }
        };

        tracing::info!(
            "Finished scraping ({}): {} records from {} listing pages",
            stop_reason.describe(),
            records.len(),
            pages_fetched
        );

        TraversalOutcome {
            records,
            stop_reason,
            pages_fetched,
            stats: self.ctx.stats(),
            elapsed: started.elapsed(),
        }
    }

    /// Detail URLs on one listing page; a failed fetch counts as an empty page
    async fn fetch_listing(&self, url: &str) -> Vec<String> {
        match self.ctx.get_text(url).await {
            Ok(html) => {
                let links = self.extractor.extract_links(&html, self.ctx.base_url());
                tracing::debug!("Found {} links on {}", links.len(), url);
                links
            }
            Err(e) => {
                tracing::warn!("Listing page fetch failed, treating as empty: {}", e);
                Vec::new()
            }
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Validates the configuration and runs a complete traversal
///
/// # Example
///
/// ```no_run
/// use elanlar::config::load_config;
/// use elanlar::crawler::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("elanlar.toml"))?;
/// let outcome = run_scrape(&config).await?;
/// println!("{} records", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: &Config) -> Result<TraversalOutcome> {
    validate(config)?;
    let paginator = Paginator::new(config)?;
    Ok(paginator.run().await)
}
