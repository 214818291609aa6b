//! Identifier extraction
//!
//! Accepts either a bare numeric id (`"12345"`) or a picker label that ends
//! with an id marker (`"Trattoria Roma (ID:98765)"`).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::Extraction;

static BARE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("Invalid bare id regex"));

static LABELED_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(ID:\s*([0-9]*)\s*\)$").expect("Invalid labeled id regex")
});

/// Where to store the identifier in the extraction
#[derive(Debug, Clone)]
pub struct IdentifierShape {
    key: String,
    as_list: bool,
}

impl IdentifierShape {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            as_list: true,
        }
    }

    /// Store the id as a plain string instead of a one-element list
    pub fn scalar(mut self) -> Self {
        self.as_list = false;
        self
    }
}

/// Pull the identifier out of `raw`, if it has one of the recognized shapes
pub fn parse_identifier(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();

    if BARE_ID_RE.is_match(trimmed) {
        return Some(trimmed);
    }

    // "(ID:)" carries no identifier
    LABELED_ID_RE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
}

pub fn extract_identifier(raw: &str, shape: &IdentifierShape) -> Option<Extraction> {
    let id = Value::String(parse_identifier(raw)?.to_string());

    let mut result = Extraction::new();
    let value = if shape.as_list { Value::Array(vec![id]) } else { id };
    result.insert(shape.key.clone(), value);
    Some(result)
}
