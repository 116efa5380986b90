//! HTML field extraction for listing and detail pages
//!
//! This module turns raw HTML into:
//! - the ordered detail-page URLs of a listing page
//! - a flat record of a detail page's fields, plus the phone-reveal
//!   credentials when the page carries them
//!
//! Missing elements never fail extraction; the field is simply absent.

use crate::crawler::phone::PhoneCredential;
use crate::record::DetailRecord;
use crate::url::resolve_link;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").expect("valid regex"));

static LISTING_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Tarix:\s*(.+)").expect("valid regex"));

static LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"📍\s*(.+?)(?:\n|$)").expect("valid regex"));

static LABEL_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Azerbaijani field labels and the keys they are stored under
const LABEL_MAP: &[(&str, &str)] = &[
    ("qiymət", "price"),
    ("marka", "brand"),
    ("model", "model"),
    ("rəng", "color"),
    ("il", "year"),
    ("mühərrik_sm³", "engine_size"),
    ("mühərrik_sm", "engine_size"),
    ("yürüş_km", "mileage"),
    ("ban_növü", "body_type"),
    ("yanacaq_növü", "fuel_type"),
    ("sürətlər_qutusu", "transmission"),
    ("kateqoriya", "category"),
];

/// A detail page's fields and, separately, its phone credentials
#[derive(Debug, Clone)]
pub struct ExtractedDetail {
    pub record: DetailRecord,
    pub credentials: Option<PhoneCredential>,
}

/// Site-specific HTML extraction
///
/// Implementations are plain synchronous functions of the HTML so they can
/// be called from any task; parsed documents never cross an await point.
pub trait FieldExtractor: Send + Sync {
    /// Detail URLs on a listing page, absolute, in document order
    fn extract_links(&self, html: &str, base_url: &Url) -> Vec<String>;

    /// Fields of a detail page fetched from `url`
    fn extract_detail(&self, html: &str, url: &str, base_url: &Url) -> ExtractedDetail;
}

/// Extractor for masinlar.az markup
#[derive(Debug, Clone, Copy, Default)]
pub struct MasinlarExtractor;

impl MasinlarExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for MasinlarExtractor {
    fn extract_links(&self, html: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        let (Ok(card_selector), Ok(link_selector)) = (
            Selector::parse("div.nobj.prod.prodbig"),
            Selector::parse("a[href]"),
        ) else {
            return links;
        };

        for card in document.select(&card_selector) {
            let href = card
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"));

            if let Some(absolute_url) = href.and_then(|href| resolve_link(href, base_url)) {
                links.push(absolute_url);
            }
        }

        links
    }

    fn extract_detail(&self, html: &str, url: &str, base_url: &Url) -> ExtractedDetail {
        let document = Html::parse_document(html);
        let mut record = DetailRecord::new(url);

        if let Some(title) = first_text(&document, "h1") {
            record.insert("title", title);
        }

        if let Some(id_text) = first_text(&document, "span.open_idshow") {
            if let Some(id) = DIGITS.captures(&id_text).and_then(|c| c.get(1)) {
                record.insert("listing_id", id.as_str());
            }
        }

        for (label, value) in labelled_values(&document) {
            record.insert(clean_label(&label), value);
        }

        if let Some(description) = first_text(&document, "p.infop100.fullteshow") {
            record.insert("full_description", description);
        }

        if let Some(contact) = first_element(&document, "div.infocontact") {
            let contact_text: String = contact.text().collect();
            if let Some(person) = contact_person(&contact_text) {
                record.insert("contact_person", person);
            }
            if let Some(location) = LOCATION.captures(&contact_text).and_then(|c| c.get(1)) {
                record.insert("location", location.as_str().trim());
            }
        }

        record.insert("images", image_urls(&document, base_url));

        if let Some(views) = first_text(&document, "span.viewsbb") {
            if let Some(date) = LISTING_DATE.captures(&views).and_then(|c| c.get(1)) {
                record.insert("listing_date", date.as_str().trim());
            }
        }

        let credentials = phone_credential(&document);

        ExtractedDetail {
            record,
            credentials,
        }
    }
}

/// Normalizes a field label into a record key
///
/// Punctuation is dropped, words are lower-cased and joined with `_`, and
/// known Azerbaijani labels are mapped to English keys. `İ` lower-cases to
/// `i` here, not to `i` plus a combining dot.
pub fn clean_label(label: &str) -> String {
    let stripped = LABEL_PUNCTUATION.replace_all(label, "");
    let key = stripped
        .split_whitespace()
        .map(|word| word.replace('İ', "I").to_lowercase())
        .collect::<Vec<_>>()
        .join("_");

    LABEL_MAP
        .iter()
        .find(|(az, _)| *az == key)
        .map(|(_, en)| (*en).to_string())
        .unwrap_or(key)
}

fn first_element<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    first_element(document, css)
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Text content with each text node trimmed and blanks dropped
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<p><b>Label</b> value</p>` pairs from the info block
fn labelled_values(document: &Html) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    let (Some(info), Ok(p_selector), Ok(b_selector)) = (
        first_element(document, "div.halfdiv.openproduct"),
        Selector::parse("p"),
        Selector::parse("b"),
    ) else {
        return pairs;
    };

    for paragraph in info.select(&p_selector) {
        let Some(bold) = paragraph.select(&b_selector).next() else {
            continue;
        };

        let label = element_text(bold);
        let full = element_text(paragraph);
        let value = full.replacen(&label, "", 1).trim().to_string();

        if !label.is_empty() && !value.is_empty() {
            pairs.push((label, value));
        }
    }

    pairs
}

/// First contact line that is not a phone number or the location line
fn contact_person(contact_text: &str) -> Option<String> {
    contact_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| {
            !line.starts_with('0') && !line.starts_with('📍') && line.chars().count() > 2
        })
        .map(|line| line.replace('👤', "").trim().to_string())
        .filter(|person| !person.is_empty())
}

fn image_urls(document: &Html, base_url: &Url) -> Vec<String> {
    let (Some(area), Ok(img_selector)) = (
        first_element(document, "#picappendarea"),
        Selector::parse("img[src]"),
    ) else {
        return Vec::new();
    };

    area.select(&img_selector)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| resolve_link(src, base_url))
        .collect()
}

fn phone_credential(document: &Html) -> Option<PhoneCredential> {
    let tel = first_element(document, "div#telshow")?;
    let attr = |name: &str| tel.value().attr(name).unwrap_or_default().trim().to_string();

    Some(PhoneCredential {
        id: attr("data-id"),
        token: attr("data-t"),
        hash: attr("data-h"),
        rf: attr("data-rf"),
    })
}
