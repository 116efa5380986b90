use crate::UrlError;
use url::Url;

/// Absolute `start` offset of a 1-based listing page
///
/// `start + (page - 1) * page_size`. Computed in `u64` so large offsets
/// cannot wrap.
///
/// # Examples
///
/// ```
/// use elanlar::url::listing_offset;
///
/// assert_eq!(listing_offset(0, 1, 20), 0);
/// assert_eq!(listing_offset(7, 3, 20), 47);
/// ```
pub fn listing_offset(start: u32, page: u32, page_size: u32) -> u64 {
    u64::from(start) + u64::from(page.saturating_sub(1)) * u64::from(page_size)
}

/// Builds the listing URL `{base}/{listing_path}/?start={offset}`
pub fn listing_url(base: &Url, listing_path: &str, offset: u64) -> String {
    format!(
        "{}/{}/?start={}",
        base.as_str().trim_end_matches('/'),
        listing_path.trim_matches('/'),
        offset
    )
}

/// Reads the `start` query parameter of a listing URL
///
/// A URL without `start` begins at offset 0. A `start` that is not a
/// non-negative integer is an error rather than silently becoming 0.
pub fn parse_start_offset(url_str: &str) -> Result<u32, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.query_pairs().find(|(key, _)| key == "start") {
        Some((_, value)) => value
            .parse::<u32>()
            .map_err(|_| UrlError::InvalidOffset(value.into_owned())),
        None => Ok(0),
    }
}
