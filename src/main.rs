//! Elanlar main entry point
//!
//! This is the command-line interface for the Elanlar classified-ad scraper.

use anyhow::Context;
use clap::Parser;
use elanlar::config::{load_config_with_hash, validate, Config, DEFAULT_BASE_URL};
use elanlar::crawler::run_scrape;
use elanlar::output::{print_sample, print_summary, write_records, RunSummary};
use elanlar::url::{listing_offset, listing_url, parse_base_url, parse_start_offset};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page cap applied by `--test-mode`
const TEST_MODE_PAGES: u32 = 10;

/// Listing URLs shown by `--dry-run`
const DRY_RUN_PREVIEW: u32 = 3;

/// Elanlar: a paginated classified-ad scraper
///
/// Walks a site's listing index page by page, fetches every listing's detail
/// page with bounded concurrency, resolves seller phone numbers, and writes
/// the results to CSV and JSON. Without a page cap the run continues until
/// the end of the index is detected.
#[derive(Parser, Debug)]
#[command(name = "elanlar")]
#[command(version)]
#[command(about = "A paginated classified-ad scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Site to scrape (overrides the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Stop after this many listing pages
    #[arg(long, value_name = "N", conflicts_with = "test_mode")]
    max_pages: Option<u32>,

    /// Scrape only the first 10 listing pages
    #[arg(long)]
    test_mode: bool,

    /// Listing offset of the first page
    #[arg(long, value_name = "OFFSET", conflicts_with = "start_url")]
    start: Option<u32>,

    /// Listing URL to start from; its `start` query parameter gives the offset
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Maximum number of requests in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Directory for the result files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// File name prefix for the result files
    #[arg(long, value_name = "STEM")]
    file_stem: Option<String>,

    /// Validate config and show what would be scraped without scraping
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::from_base_url(DEFAULT_BASE_URL),
    };

    apply_overrides(&mut config, &cli)?;
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_scrape(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("elanlar=info,warn"),
            1 => EnvFilter::new("elanlar=debug,info"),
            2 => EnvFilter::new("elanlar=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Folds command-line flags into the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
    }

    if cli.test_mode {
        config.pagination.max_pages = Some(TEST_MODE_PAGES);
    } else if let Some(max_pages) = cli.max_pages {
        config.pagination.max_pages = Some(max_pages);
    }

    if let Some(start) = cli.start {
        config.site.start_offset = start;
    } else if let Some(start_url) = &cli.start_url {
        config.site.start_offset = parse_start_offset(start_url)
            .with_context(|| format!("Cannot read start offset from {}", start_url))?;
    }

    if let Some(concurrency) = cli.concurrency {
        config.http.concurrency = concurrency;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(stem) = &cli.file_stem {
        config.output.file_stem = stem.clone();
    }

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Elanlar Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing path: {}", config.site.listing_path);
    println!("  Start offset: {}", config.site.start_offset);

    let pagination = &config.pagination;
    println!("\nPagination:");
    println!("  Page size: {}", pagination.page_size);
    match pagination.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited (until end of listings)"),
    }
    println!("  Safety ceiling: {} pages", pagination.safety_ceiling);
    println!(
        "  Empty pages before stop: {}",
        pagination.empty_page_tolerance
    );
    println!(
        "  Loop detection: after page {}, first {} listings",
        pagination.loop_detection_start, pagination.loop_prefix_len
    );
    println!(
        "  Duplicate ratio threshold: {:.0}%",
        pagination.duplicate_ratio * 100.0
    );
    println!(
        "  Delays: {}ms between pages, {}ms after empty pages",
        pagination.page_delay_ms, pagination.empty_page_delay_ms
    );

    println!("\nHTTP:");
    println!("  Concurrency: {}", config.http.concurrency);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  User agent: {}", config.http.user_agent);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File stem: {}", config.output.file_stem);
    let formats: Vec<_> = config.output.formats.iter().map(|f| f.extension()).collect();
    println!("  Formats: {}", formats.join(", "));

    let base = parse_base_url(&config.site.base_url)?;
    let preview = pagination
        .max_pages
        .map_or(DRY_RUN_PREVIEW, |max| max.min(DRY_RUN_PREVIEW));
    println!("\nFirst listing pages:");
    for page in 1..=preview {
        let offset = listing_offset(config.site.start_offset, page, pagination.page_size);
        println!(
            "  {}. {}",
            page,
            listing_url(&base, &config.site.listing_path, offset)
        );
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main scrape: traverse, write results, summarise
async fn handle_scrape(config: &Config) -> anyhow::Result<()> {
    match config.pagination.max_pages {
        Some(max) => tracing::info!("Starting scrape of {} (max {} pages)", config.site.base_url, max),
        None => tracing::info!(
            "Starting scrape of {} (until end of listings is detected)",
            config.site.base_url
        ),
    }

    let outcome = run_scrape(config).await.context("Scrape failed to start")?;
    let summary = RunSummary::from_outcome(&outcome);

    tracing::info!(
        "Scrape finished: {} records, {} with phone, stopped by {} ({})",
        summary.total_records,
        summary.records_with_phone,
        summary.stop_reason,
        summary.completion()
    );
    if !summary.stop_reason.is_end_of_data() {
        tracing::warn!(
            "Run ended on a page bound after {} pages; raise --max-pages or safety-ceiling to continue",
            summary.pages_visited
        );
    }

    if outcome.records.is_empty() {
        println!("No records found");
        print_summary(&summary);
        return Ok(());
    }

    let written =
        write_records(&config.output, &outcome.records).context("Failed to write results")?;
    for path in &written {
        println!("✓ Saved results to: {}", path.display());
    }
    println!();

    print_summary(&summary);
    if let Some(first) = outcome.records.first() {
        print_sample(first);
    }

    Ok(())
}
