use serde::Deserialize;

/// Site scraped when neither a config file nor `--base-url` names one
pub const DEFAULT_BASE_URL: &str = "https://masinlar.az";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// Main configuration structure for Elanlar
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with every default except the site base URL
    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                base_url: base_url.into(),
                listing_path: default_listing_path(),
                start_offset: 0,
            },
            pagination: PaginationConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Which site to scrape and where its listing index lives
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host of the site, e.g. `https://masinlar.az`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated listing index, without slashes
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,

    /// Offset of the first listing page (`?start=` value)
    #[serde(rename = "start-offset", default)]
    pub start_offset: u32,
}

/// Pagination and end-of-data detection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Number of listings per index page; the offset step
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Hard page limit that is never exceeded
    #[serde(rename = "safety-ceiling")]
    pub safety_ceiling: u32,

    /// Optional user-requested page limit
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,

    /// Consecutive empty pages that end the traversal
    #[serde(rename = "empty-page-tolerance")]
    pub empty_page_tolerance: u32,

    /// Pages after this index are compared against page 1's prefix
    #[serde(rename = "loop-detection-start")]
    pub loop_detection_start: u32,

    /// Number of leading URLs compared for loop detection
    #[serde(rename = "loop-prefix-len")]
    pub loop_prefix_len: usize,

    /// Fraction of already-seen URLs on a page above which the traversal stops
    #[serde(rename = "duplicate-ratio")]
    pub duplicate_ratio: f64,

    /// Delay after a page with listings (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Delay after an empty page (milliseconds)
    #[serde(rename = "empty-page-delay-ms")]
    pub empty_page_delay_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            safety_ceiling: 60,
            max_pages: None,
            empty_page_tolerance: 3,
            loop_detection_start: 35,
            loop_prefix_len: 5,
            duplicate_ratio: 0.8,
            page_delay_ms: 500,
            empty_page_delay_ms: 2000,
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Maximum number of requests in flight at once, across all stages
    pub concurrency: u32,

    /// Total timeout per request (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            concurrency: 15,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-GB,en-US;q=0.9,en;q=0.8,ru;q=0.7,az;q=0.6".to_string(),
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the result files are written to
    pub directory: String,

    /// File name prefix; a timestamp and extension are appended
    #[serde(rename = "file-stem")]
    pub file_stem: String,

    /// Formats to write
    pub formats: Vec<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_stem: "masinlar_az_async".to_string(),
            formats: vec![OutputFormat::Csv, OutputFormat::Json],
        }
    }
}

/// A result file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

fn default_listing_path() -> String {
    "masin-satisi".to_string()
}
