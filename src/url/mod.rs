//! URL handling module for Elanlar
//!
//! This module builds listing-page URLs from offsets, reads the starting
//! offset back out of an operator-supplied URL, and resolves the relative
//! links found in listing and detail pages.

mod listing;
mod resolve;

pub use listing::{listing_offset, listing_url, parse_start_offset};
pub use resolve::{ajax_endpoint, resolve_link};

use crate::UrlError;
use url::Url;

/// Parses and checks a site base URL
///
/// Only `http` and `https` are accepted; `http` is kept so the scraper can be
/// pointed at local mock servers.
///
/// # Examples
///
/// ```
/// use elanlar::url::parse_base_url;
///
/// let base = parse_base_url("https://masinlar.az").unwrap();
/// assert_eq!(base.as_str(), "https://masinlar.az/");
/// assert!(parse_base_url("ftp://masinlar.az").is_err());
/// ```
pub fn parse_base_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}
