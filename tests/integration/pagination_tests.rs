//! End-to-end traversal tests

use crate::common::*;
use elanlar::config::Config;
use elanlar::crawler::run_scrape;
use elanlar::{ConfigError, ScrapeError, StopReason};
use std::collections::HashSet;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_offsets_follow_start_and_page_size() {
    let server = MockServer::start().await;

    mount_listing(&server, 40, &[1, 2]).await;
    mount_listing(&server, 60, &[3, 4]).await;
    mount_listing(&server, 80, &[5, 6]).await;
    mount_details(&server, 1..=6).await;

    let mut config = test_config(&server);
    config.site.start_offset = 40;
    config.pagination.max_pages = Some(3);

    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.stop_reason, StopReason::PageCap);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.records.len(), 6);
    assert_eq!(requested_offsets(&server).await, vec![40, 60, 80]);
}

#[tokio::test]
async fn test_stops_after_three_empty_pages() {
    let server = MockServer::start().await;

    mount_listing(&server, 0, &[1, 2, 3]).await;
    mount_empty_listings(&server).await;
    mount_details(&server, 1..=3).await;

    let config = test_config(&server);
    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.stop_reason, StopReason::EmptyPages);
    assert_eq!(outcome.records.len(), 3);
    // page 1 plus three empty pages; page 5 is never requested
    assert_eq!(requested_offsets(&server).await, vec![0, 20, 40, 60]);
}

#[tokio::test]
async fn test_empty_streak_resets_on_listings() {
    let server = MockServer::start().await;

    mount_listing(&server, 0, &[1]).await;
    mount_listing(&server, 60, &[2]).await;
    mount_empty_listings(&server).await;
    mount_details(&server, 1..=2).await;

    let config = test_config(&server);
    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.stop_reason, StopReason::EmptyPages);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        requested_offsets(&server).await,
        vec![0, 20, 40, 60, 80, 100, 120]
    );
}

#[tokio::test]
async fn test_listing_failure_counts_as_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_empty_listings(&server).await;

    let config = test_config(&server);
    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.stop_reason, StopReason::EmptyPages);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.stats.failures, 1);
}

#[tokio::test]
async fn test_loop_detected_when_page_one_repeats() {
    let server = MockServer::start().await;

    // pages 1..=39 carry two fresh listings each
    for page in 1..=39u32 {
        let offset = u64::from(page - 1) * 20;
        mount_listing(&server, offset, &[2 * page - 1, 2 * page]).await;
    }
    // page 40 serves page 1 again
    mount_listing(&server, 780, &[1, 2]).await;
    mount_details(&server, 1..=78).await;

    let config = test_config(&server);
    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.stop_reason, StopReason::LoopDetected);
    assert_eq!(outcome.pages_fetched, 40);
    assert_eq!(outcome.records.len(), 78);
    assert_eq!(requested_offsets(&server).await.last(), Some(&780));
}

#[tokio::test]
async fn test_high_duplicate_rate_stops_before_dispatch() {
    let server = MockServer::start().await;

    mount_listing(&server, 0, &(1..=10).collect::<Vec<u32>>()).await;
    let mut second: Vec<u32> = (1..=9).collect();
    second.push(11);
    mount_listing(&server, 20, &second).await;
    mount_details(&server, 1..=11).await;

    let config = test_config(&server);
    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.stop_reason, StopReason::DuplicateRate);
    assert_eq!(outcome.records.len(), 10);
    assert!(!requested_details(&server)
        .await
        .contains(&detail_path(11)));
}

#[tokio::test]
async fn test_each_detail_url_scraped_once() {
    let server = MockServer::start().await;

    mount_listing(&server, 0, &[1, 2, 3]).await;
    mount_listing(&server, 20, &[3, 4, 5, 4]).await;
    mount_empty_listings(&server).await;
    mount_details(&server, 1..=5).await;

    let config = test_config(&server);
    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.records.len(), 5);

    let urls: HashSet<&str> = outcome.records.iter().map(|r| r.detail_url()).collect();
    assert_eq!(urls.len(), 5);
    assert!(urls.contains(detail_url(&server, 4).as_str()));

    let mut details = requested_details(&server).await;
    details.sort();
    details.dedup();
    assert_eq!(details.len(), requested_details(&server).await.len());
}

#[tokio::test]
async fn test_safety_ceiling_bounds_unbounded_run() {
    let server = MockServer::start().await;

    // every page has a fresh listing, so only the ceiling can stop the run
    for page in 1..=5u32 {
        mount_listing(&server, u64::from(page - 1) * 20, &[page]).await;
    }
    mount_details(&server, 1..=5).await;

    let mut config = test_config(&server);
    config.pagination.safety_ceiling = 4;
    config.pagination.max_pages = Some(10);

    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.stop_reason, StopReason::SafetyCeiling);
    assert_eq!(outcome.pages_fetched, 4);
    assert_eq!(outcome.records.len(), 4);
}

#[tokio::test]
async fn test_unsupported_base_url_rejected() {
    let config = Config::from_base_url("ftp://masinlar.az");

    let result = run_scrape(&config).await;
    assert!(matches!(
        result,
        Err(ScrapeError::Config(ConfigError::InvalidUrl(_)))
    ));
}

#[tokio::test]
async fn test_invalid_limits_rejected_before_any_request() {
    let server = MockServer::start().await;
    mount_empty_listings(&server).await;

    let mut config = test_config(&server);
    config.http.concurrency = 0;

    let result = run_scrape(&config).await;
    assert!(matches!(
        result,
        Err(ScrapeError::Config(ConfigError::Validation(_)))
    ));
    assert!(requested_offsets(&server).await.is_empty());
}
