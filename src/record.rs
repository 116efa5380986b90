//! Detail records produced by the scraper
//!
//! A record is a flat, ordered mapping from field name to value. It always
//! carries the `detail_url` it was extracted from.

use serde::Serialize;
use std::collections::BTreeMap;

/// Key every record carries
pub const DETAIL_URL_KEY: &str = "detail_url";

/// Key set once a phone number was resolved
pub const PHONE_KEY: &str = "phone";

/// A single extracted field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Returns the text value, or None for lists
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Flattens the value into one cell of delimited text
    ///
    /// Lists are written as a JSON array so that values containing commas
    /// stay unambiguous.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => {
                serde_json::to_string(items).unwrap_or_else(|_| items.join(", "))
            }
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// One listing's extracted fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DetailRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl DetailRecord {
    /// Creates a record holding only its `detail_url`
    pub fn new(detail_url: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            DETAIL_URL_KEY.to_string(),
            FieldValue::Text(detail_url.into()),
        );
        Self { fields }
    }

    /// Sets a field; `detail_url` cannot be overwritten
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        if key == DETAIL_URL_KEY {
            return;
        }
        self.fields.insert(key, value.into());
    }

    /// Consumes the record and returns it with the phone attached
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.fields
            .insert(PHONE_KEY.to_string(), FieldValue::Text(phone.into()));
        self
    }

    pub fn detail_url(&self) -> &str {
        self.fields
            .get(DETAIL_URL_KEY)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Shortcut for text-valued fields
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn phone(&self) -> Option<&str> {
        self.text(PHONE_KEY)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
