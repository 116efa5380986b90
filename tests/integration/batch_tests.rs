//! Detail batch and phone resolution tests

use crate::common::*;
use elanlar::crawler::{run_scrape, BatchFetcher, FieldExtractor, MasinlarExtractor, ScrapeContext};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn batch_fetcher(server: &MockServer, concurrency: u32) -> (Arc<ScrapeContext>, BatchFetcher) {
    let mut config = test_config(server);
    config.http.concurrency = concurrency;

    let ctx = Arc::new(ScrapeContext::new(&config).expect("context should build"));
    let extractor: Arc<dyn FieldExtractor> = Arc::new(MasinlarExtractor::new());
    let fetcher = BatchFetcher::new(Arc::clone(&ctx), extractor);
    (ctx, fetcher)
}

async fn mount_phone_detail(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(detail_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(id, true)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_phone_resolved_through_ajax() {
    let server = MockServer::start().await;
    mount_phone_detail(&server, 46348).await;

    Mock::given(method("POST"))
        .and(path("/ajax.php"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(body_string_contains("act=telshow"))
        .and(body_string_contains("id=46348"))
        .and(body_string_contains("h=hash46348"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"ok":1,"tel":"0501234567"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (_, fetcher) = batch_fetcher(&server, 5);
    let records = fetcher.fetch_all(vec![detail_url(&server, 46348)]).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.phone(), Some("0501234567"));
    assert_eq!(record.detail_url(), detail_url(&server, 46348));
    assert_eq!(record.text("brand"), Some("Kia"));

    // the lookup credentials never reach the record
    assert!(record
        .keys()
        .all(|key| !key.contains("ajax") && !key.starts_with("data")));
}

#[tokio::test]
async fn test_failed_phone_lookup_keeps_record() {
    let server = MockServer::start().await;
    mount_phone_detail(&server, 7).await;

    Mock::given(method("POST"))
        .and(path("/ajax.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":0}"#))
        .mount(&server)
        .await;

    let (_, fetcher) = batch_fetcher(&server, 5);
    let records = fetcher.fetch_all(vec![detail_url(&server, 7)]).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].phone(), None);
    assert!(records[0].contains_key("title"));
}

#[tokio::test]
async fn test_no_phone_call_without_credentials() {
    let server = MockServer::start().await;
    mount_detail(&server, 8).await;

    Mock::given(method("POST"))
        .and(path("/ajax.php"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (ctx, fetcher) = batch_fetcher(&server, 5);
    let records = fetcher.fetch_all(vec![detail_url(&server, 8)]).await;

    assert_eq!(records.len(), 1);
    assert_eq!(ctx.stats().requests, 1);
}

#[tokio::test]
async fn test_failed_detail_dropped_from_batch() {
    let server = MockServer::start().await;

    mount_details(&server, [1, 2, 4, 5]).await;
    Mock::given(method("GET"))
        .and(path(detail_path(3)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (ctx, fetcher) = batch_fetcher(&server, 5);
    let urls: Vec<String> = (1..=5).map(|id| detail_url(&server, id)).collect();
    let records = fetcher.fetch_all(urls).await;

    assert_eq!(records.len(), 4);
    assert!(records
        .iter()
        .all(|r| r.detail_url() != detail_url(&server, 3)));

    let stats = ctx.stats();
    assert_eq!(stats.requests, 5);
    assert_eq!(stats.failures, 1);
}

#[tokio::test]
async fn test_in_flight_requests_bounded_by_concurrency() {
    let server = MockServer::start().await;

    for id in 1..=12 {
        Mock::given(method("GET"))
            .and(path(detail_path(id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_html(id, false))
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&server)
            .await;
    }

    let (ctx, fetcher) = batch_fetcher(&server, 3);
    let urls: Vec<String> = (1..=12).map(|id| detail_url(&server, id)).collect();
    let records = fetcher.fetch_all(urls).await;

    assert_eq!(records.len(), 12);

    let stats = ctx.stats();
    assert!(stats.peak_in_flight <= 3, "peak was {}", stats.peak_in_flight);
    assert!(stats.peak_in_flight >= 2, "requests never overlapped");
}

#[tokio::test]
async fn test_in_flight_bound_covers_listing_detail_and_phone_calls() {
    let server = MockServer::start().await;

    let ids: Vec<u32> = (1..=10).collect();
    mount_listing(&server, 0, &ids).await;
    mount_empty_listings(&server).await;

    for &id in &ids {
        Mock::given(method("GET"))
            .and(path(detail_path(id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_html(id, true))
                    .set_delay(Duration::from_millis(30)),
            )
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/ajax.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"ok":1,"tel":"0501234567"}"#)
                .set_delay(Duration::from_millis(80)),
        )
        .expect(10)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.http.concurrency = 2;

    let outcome = run_scrape(&config).await.expect("scrape should start");

    assert_eq!(outcome.records.len(), 10);
    assert!(outcome.records.iter().all(|r| r.phone() == Some("0501234567")));

    // 4 listing pages, 10 detail pages, 10 phone lookups
    assert_eq!(outcome.stats.requests, 24);
    assert!(
        outcome.stats.peak_in_flight <= 2,
        "peak was {}",
        outcome.stats.peak_in_flight
    );
}
