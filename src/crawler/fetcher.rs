//! Request context: the HTTP client and the global request limiter
//!
//! Every outbound request in a run goes through one `ScrapeContext`:
//! listing pages, detail pages and phone-reveal calls all draw permits from
//! the same semaphore, so the number of requests in flight to the site never
//! exceeds `http.concurrency`. The permit is held until the response body has
//! been read.
//!
//! Failures are classified the same way for every caller:
//! - non-2xx status → `FetchError::HttpStatus`
//! - timeout (connect or total) → `FetchError::Timeout`
//! - anything else on the transport → `FetchError::Network`

use crate::config::{Config, HttpConfig};
use crate::url::parse_base_url;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::{Client, RequestBuilder};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Semaphore, SemaphorePermit};
use url::Url;

/// Why a single request failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Unreadable response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_decode() || error.is_body() {
            Self::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else if error.is_connect() {
            Self::Network {
                url: url.to_string(),
                message: "Connection refused".to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Counters kept across one run
#[derive(Debug, Default)]
struct RequestCounters {
    requests: AtomicU64,
    failures: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Point-in-time copy of the request counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    /// Requests sent (listing, detail and phone calls)
    pub requests: u64,

    /// Requests that ended in a `FetchError`
    pub failures: u64,

    /// Highest number of requests that were in flight at the same time
    pub peak_in_flight: usize,
}

/// A held limiter permit; keeps the in-flight gauge honest
struct InFlight<'a> {
    counters: &'a RequestCounters,
    _permit: SemaphorePermit<'a>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // runs before the permit field is dropped
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Builds the HTTP client used for a run
///
/// Browser-like headers, gzip/brotli, a total timeout per request and a
/// shorter connect timeout. Redirects are followed with reqwest's default
/// policy since detail pages occasionally move.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client, limiter and site base URL for one traversal run
///
/// Shared behind an `Arc` by the controller and every detail task.
pub struct ScrapeContext {
    client: Client,
    limiter: Semaphore,
    concurrency: usize,
    base_url: Url,
    counters: RequestCounters,
}

impl ScrapeContext {
    /// Creates a context from a validated configuration
    pub fn new(config: &Config) -> crate::Result<Self> {
        let base_url = parse_base_url(&config.site.base_url)?;
        let client = build_http_client(&config.http)?;
        Ok(Self::with_client(
            client,
            base_url,
            config.http.concurrency as usize,
        ))
    }

    /// Creates a context around an existing client
    pub fn with_client(client: Client, base_url: Url, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            client,
            limiter: Semaphore::new(concurrency),
            concurrency,
            base_url,
            counters: RequestCounters::default(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Limiter capacity
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Snapshot of the request counters
    pub fn stats(&self) -> RequestStats {
        RequestStats {
            requests: self.counters.requests.load(Ordering::SeqCst),
            failures: self.counters.failures.load(Ordering::SeqCst),
            peak_in_flight: self.counters.peak_in_flight.load(Ordering::SeqCst),
        }
    }

    /// GETs a page and returns its body
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let request = self.client.get(url);
        self.execute(url, request).await
    }

    /// POSTs a url-encoded form as an XHR and returns the response body
    ///
    /// `referer` is sent as the `Referer` header; `Origin` is the site base.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        referer: &str,
    ) -> Result<String, FetchError> {
        let origin = self.base_url.origin().ascii_serialization();
        let request = self
            .client
            .post(url)
            .form(form)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .header(REFERER, referer)
            .header(ORIGIN, origin);
        self.execute(url, request).await
    }

    async fn execute(&self, url: &str, request: RequestBuilder) -> Result<String, FetchError> {
        let _in_flight = self.acquire(url).await?;
        self.counters.requests.fetch_add(1, Ordering::SeqCst);

        let result = match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    response
                        .text()
                        .await
                        .map_err(|e| FetchError::from_reqwest(url, e))
                } else {
                    Err(FetchError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    })
                }
            }
            Err(e) => Err(FetchError::from_reqwest(url, e)),
        };

        if result.is_err() {
            self.counters.failures.fetch_add(1, Ordering::SeqCst);
        }
        result
    }

    async fn acquire(&self, url: &str) -> Result<InFlight<'_>, FetchError> {
        let permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchError::Network {
                url: url.to_string(),
                message: "request limiter closed".to_string(),
            })?;

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        Ok(InFlight {
            counters: &self.counters,
            _permit: permit,
        })
    }
}
