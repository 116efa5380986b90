use crate::config::PaginationConfig;
use crate::state::StopReason;
use std::collections::HashSet;

/// Every detail URL observed during one traversal
///
/// Grows monotonically and lives exactly as long as the traversal.
#[derive(Debug, Clone, Default)]
pub struct SeenUrlSet {
    urls: HashSet<String>,
}

impl SeenUrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Counts how many entries of `urls` were already seen
    ///
    /// Repeated entries within `urls` are counted once per occurrence.
    pub fn count_seen(&self, urls: &[String]) -> usize {
        urls.iter().filter(|url| self.urls.contains(*url)).count()
    }

    /// Records `urls`, returning those not seen before in their original order
    ///
    /// A URL repeated within `urls` is returned only once.
    pub fn insert_page(&mut self, urls: Vec<String>) -> Vec<String> {
        let mut fresh = Vec::with_capacity(urls.len());
        for url in urls {
            if self.urls.insert(url.clone()) {
                fresh.push(url);
            }
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// What the controller should do with a listing page it just fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    /// Empty page within tolerance: cool down, then move on
    SkipEmpty { consecutive: u32 },

    /// Stop the traversal
    Stop(StopReason),

    /// Fetch these unseen detail URLs; may be empty if every URL was seen
    Dispatch { urls: Vec<String>, duplicates: usize },
}

/// Single-owner traversal state
///
/// Only the pagination controller holds this, and it only changes between
/// batches.
#[derive(Debug, Clone)]
pub struct TraversalState {
    limits: PaginationConfig,
    page: u32,
    records: usize,
    consecutive_empty: u32,
    first_page_prefix: Option<Vec<String>>,
    seen: SeenUrlSet,
}

impl TraversalState {
    /// Creates the state for a traversal starting at page 1
    pub fn new(limits: PaginationConfig) -> Self {
        Self {
            limits,
            page: 1,
            records: 0,
            consecutive_empty: 0,
            first_page_prefix: None,
            seen: SeenUrlSet::new(),
        }
    }

    /// The 1-based index of the page about to be, or being, processed
    pub fn current_page(&self) -> u32 {
        self.page
    }

    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn consecutive_empty(&self) -> u32 {
        self.consecutive_empty
    }

    pub fn seen(&self) -> &SeenUrlSet {
        &self.seen
    }

    pub fn limits(&self) -> &PaginationConfig {
        &self.limits
    }

    /// Checks the page bounds before the current page is fetched
    ///
    /// The safety ceiling is checked first so that it wins over an explicit
    /// cap set above it.
    pub fn check_bounds(&self) -> Option<StopReason> {
        if self.page > self.limits.safety_ceiling {
            return Some(StopReason::SafetyCeiling);
        }

        match self.limits.max_pages {
            Some(max_pages) if self.page > max_pages => Some(StopReason::PageCap),
            _ => None,
        }
    }

    /// Decides what to do with the URLs extracted from the current page
    ///
    /// A listing fetch failure should be passed in as an empty list.
    /// On `Dispatch`, every URL on the page has been added to the seen set
    /// before this returns.
    pub fn evaluate(&mut self, urls: Vec<String>) -> PageDecision {
        if urls.is_empty() {
            self.consecutive_empty += 1;
            if self.consecutive_empty >= self.limits.empty_page_tolerance {
                return PageDecision::Stop(StopReason::EmptyPages);
            }
            return PageDecision::SkipEmpty {
                consecutive: self.consecutive_empty,
            };
        }

        self.consecutive_empty = 0;

        let prefix_len = self.limits.loop_prefix_len.min(urls.len());
        let prefix = &urls[..prefix_len];

        if self.page == 1 {
            self.first_page_prefix = Some(prefix.to_vec());
        } else if self.page > self.limits.loop_detection_start
            && self.first_page_prefix.as_deref() == Some(prefix)
        {
            return PageDecision::Stop(StopReason::LoopDetected);
        }

        let duplicates = self.seen.count_seen(&urls);
        if duplicates as f64 > urls.len() as f64 * self.limits.duplicate_ratio {
            return PageDecision::Stop(StopReason::DuplicateRate);
        }

        let fresh = self.seen.insert_page(urls);
        PageDecision::Dispatch {
            urls: fresh,
            duplicates,
        }
    }

    /// Adds a finished batch's record count
    pub fn record_batch(&mut self, records: usize) {
        self.records += records;
    }

    /// Moves on to the next page
    pub fn advance(&mut self) {
        self.page += 1;
    }
}
