//! Concurrent detail-page fetching for one listing page
//!
//! Each URL runs its own pipeline on a spawned task:
//! fetch detail HTML → extract fields → resolve phone if credentials were
//! found → emit the record. A failure on one URL is logged and drops only
//! that URL. Concurrency is bounded by the shared limiter in
//! [`ScrapeContext`], not by the number of spawned tasks.

use crate::crawler::fetcher::ScrapeContext;
use crate::crawler::parser::FieldExtractor;
use crate::crawler::phone::PhoneResolver;
use crate::record::DetailRecord;
use crate::Result;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fetches, extracts and enriches batches of detail pages
#[derive(Clone)]
pub struct BatchFetcher {
    ctx: Arc<ScrapeContext>,
    extractor: Arc<dyn FieldExtractor>,
    phones: PhoneResolver,
}

impl BatchFetcher {
    pub fn new(ctx: Arc<ScrapeContext>, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            ctx,
            extractor,
            phones: PhoneResolver::new(),
        }
    }

    /// Runs the per-URL pipeline for every URL and collects the successes
    ///
    /// Records come back in completion order. The batch always runs to
    /// completion; no failure cancels a sibling.
    pub async fn fetch_all(&self, urls: Vec<String>) -> Vec<DetailRecord> {
        let mut tasks = JoinSet::new();

        for url in urls {
            let worker = self.clone();
            tasks.spawn(async move {
                let result = worker.fetch_one(&url).await;
                (url, result)
            });
        }

        let mut records = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(record))) => records.push(record),
                Ok((url, Err(e))) => {
                    tracing::error!("Error scraping {}: {}", url, e);
                }
                Err(e) => {
                    tracing::error!("Detail task failed: {}", e);
                }
            }
        }

        records
    }

    /// One detail page: fetch, extract, attach phone
    pub async fn fetch_one(&self, url: &str) -> Result<DetailRecord> {
        let html = self.ctx.get_text(url).await?;

        // the parsed document is dropped here, before the next await
        let detail = self
            .extractor
            .extract_detail(&html, url, self.ctx.base_url());

        let record = match detail.credentials {
            Some(credential) => {
                match self.phones.resolve(&self.ctx, &credential, url).await {
                    Some(phone) => detail.record.with_phone(phone),
                    None => detail.record,
                }
            }
            None => detail.record,
        };

        Ok(record)
    }
}
