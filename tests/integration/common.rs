//! Shared fixtures for the integration tests

use elanlar::config::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const LISTING_PATH: &str = "/masin-satisi/";

/// Default configuration pointed at the mock server, with no delays
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::from_base_url(server.uri());
    config.pagination.page_delay_ms = 0;
    config.pagination.empty_page_delay_ms = 0;
    config.http.concurrency = 5;
    config.http.timeout_secs = 5;
    config
}

pub fn detail_path(id: u32) -> String {
    format!("/elan-{}.html", id)
}

pub fn detail_url(server: &MockServer, id: u32) -> String {
    format!("{}{}", server.uri(), detail_path(id))
}

/// Listing page with one card per id, in order
pub fn listing_html(ids: &[u32]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="nobj prod prodbig">
                    <a href="{path}"><img src="/thumb-{id}.jpg"></a>
                    <div class="prodname"><a href="{path}">Listing {id}</a></div>
                </div>"#,
                path = detail_path(*id),
                id = id
            )
        })
        .collect();
    format!("<html><body><div class=\"prodlist\">{}</div></body></html>", cards)
}

/// Detail page; `with_phone` adds the telshow button
pub fn detail_html(id: u32, with_phone: bool) -> String {
    let telshow = if with_phone {
        format!(
            r#"<div id="telshow" data-id="{}" data-t="tok{}" data-h="hash{}" data-rf="">Nömrəni göstər</div>"#,
            id, id, id
        )
    } else {
        String::new()
    };

    format!(
        r#"<html><body>
            <h1>Kia Rio, 2015 il #{id}</h1>
            <span class="open_idshow">Elanın nömrəsi: {id}</span>
            <div class="halfdiv openproduct">
                <p><b>Qiymət:</b> 14 500 AZN</p>
                <p><b>Marka:</b> Kia</p>
            </div>
            <div class="infocontact">
                <span class="name">Elçin</span>
                📍 Bakı
            </div>
            {telshow}
        </body></html>"#,
        id = id,
        telshow = telshow
    )
}

/// Serves `ids` as the listing page at `offset`
pub async fn mount_listing(server: &MockServer, offset: u64, ids: &[u32]) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("start", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(ids)))
        .mount(server)
        .await;
}

/// Serves an empty listing page for every offset not mounted earlier
pub async fn mount_empty_listings(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[])))
        .mount(server)
        .await;
}

/// Serves a phone-less detail page for `id`
pub async fn mount_detail(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(detail_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(id, false)))
        .mount(server)
        .await;
}

pub async fn mount_details(server: &MockServer, ids: impl IntoIterator<Item = u32>) {
    for id in ids {
        mount_detail(server, id).await;
    }
}

/// Listing offsets requested so far, in request order
pub async fn requested_offsets(server: &MockServer) -> Vec<u64> {
    received(server)
        .await
        .iter()
        .filter(|request| request.url.path() == LISTING_PATH)
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "start")
                .and_then(|(_, value)| value.parse().ok())
        })
        .collect()
}

/// Detail paths requested so far
pub async fn requested_details(server: &MockServer) -> Vec<String> {
    received(server)
        .await
        .iter()
        .map(|request| request.url.path().to_string())
        .filter(|path| path.starts_with("/elan-"))
        .collect()
}

async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}
