//! Phone number recovery through the site's AJAX endpoint
//!
//! Detail pages hide the seller's phone behind a `telshow` button carrying a
//! per-listing id/token/hash. Posting those back to `ajax.php` returns
//! `{"ok": 1, "tel": "..."}`. Any other answer means "no phone".

use crate::crawler::fetcher::ScrapeContext;
use crate::url::ajax_endpoint;
use serde_json::Value;

/// Credentials read from a detail page's `#telshow` element
///
/// Consumed by [`PhoneResolver::resolve`] and never stored in a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhoneCredential {
    /// `data-id`: listing id
    pub id: String,
    /// `data-t`: per-page token
    pub token: String,
    /// `data-h`: request hash
    pub hash: String,
    /// `data-rf`: optional referral marker
    pub rf: String,
}

impl PhoneCredential {
    /// True when the id and hash needed for the call are present
    pub fn is_usable(&self) -> bool {
        !self.id.is_empty() && !self.hash.is_empty()
    }
}

/// Best-effort phone lookup; never fails the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneResolver;

impl PhoneResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the phone for `credential`, or None on any failure
    ///
    /// The request goes through the context's limiter like every other call.
    pub async fn resolve(
        &self,
        ctx: &ScrapeContext,
        credential: &PhoneCredential,
        referer: &str,
    ) -> Option<String> {
        if !credential.is_usable() {
            tracing::debug!("Skipping phone lookup for {}: incomplete credentials", referer);
            return None;
        }

        let endpoint = ajax_endpoint(ctx.base_url());
        let form = [
            ("act", "telshow"),
            ("id", credential.id.as_str()),
            ("t", credential.token.as_str()),
            ("h", credential.hash.as_str()),
            ("rf", credential.rf.as_str()),
        ];

        let body = match ctx.post_form(&endpoint, &form, referer).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error fetching phone for ID {}: {}", credential.id, e);
                return None;
            }
        };

        let phone = parse_phone_response(&body);
        match &phone {
            Some(tel) => tracing::debug!("Got phone for ID {}: {}", credential.id, tel),
            None => tracing::debug!("No phone in response for ID {}", credential.id),
        }
        phone
    }
}

/// Extracts `tel` from a `{"ok": 1, "tel": "..."}` body
///
/// `ok` may arrive as the number 1 or the string "1"; `tel` must be a
/// non-empty string.
pub fn parse_phone_response(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let ok = match value.get("ok")? {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s.trim() == "1",
        _ => false,
    };
    if !ok {
        return None;
    }

    value
        .get("tel")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|tel| !tel.is_empty())
        .map(str::to_string)
}
