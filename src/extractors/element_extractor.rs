//! Element embed extraction
//!
//! Recognizes a paired element such as
//! `<iframe src="https://..." width="800" height="600"></iframe>` and collects
//! its `name="value"` / `name='value'` attribute pairs. Any value that looks
//! like the integration's target URL is stored under `url`, whatever the
//! attribute was called.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::Extraction;

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)([A-Za-z_][\w:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("Invalid attribute pair regex")
});

/// Element shape: tag name, URL pattern and the attributes worth keeping
#[derive(Debug, Clone)]
pub struct ElementShape {
    container: Regex,
    url_pattern: Regex,
    capture: Vec<String>,
    accept_bare_url: bool,
}

impl ElementShape {
    pub fn new<I, S>(tag: &str, url_pattern: &str, capture: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Opening tag (quoted values may contain '>'), then the matching close tag
        let container = Regex::new(&format!(
            r#"(?is)<{tag}\b((?:"[^"]*"|'[^']*'|[^'">])*)>.*?</{tag}\s*>"#,
            tag = regex::escape(tag)
        ))?;

        Ok(Self {
            container,
            url_pattern: Regex::new(url_pattern)?,
            capture: capture.into_iter().map(Into::into).collect(),
            accept_bare_url: false,
        })
    }

    /// Also accept a pasted URL on its own, without the surrounding element
    pub fn accept_bare_url(mut self) -> Self {
        self.accept_bare_url = true;
        self
    }

    pub fn is_url(&self, value: &str) -> bool {
        self.url_pattern.is_match(value)
    }
}

/// Extract `url` plus the captured attributes from an element embed
pub fn extract_element(raw: &str, shape: &ElementShape) -> Option<Extraction> {
    let Some(captures) = shape.container.captures(raw) else {
        return extract_bare_url(raw, shape);
    };
    let attributes = captures.get(1).map_or("", |m| m.as_str());

    let mut url: Option<String> = None;
    let mut found: Vec<(String, String)> = Vec::new();

    for pair in ATTRIBUTE_RE.captures_iter(attributes) {
        let name = pair[1].to_ascii_lowercase();
        let value = pair
            .get(2)
            .or_else(|| pair.get(3))
            .map_or("", |m| m.as_str());

        if shape.is_url(value) {
            // First URL-shaped value owns `url`
            if url.is_none() {
                url = Some(value.trim().to_string());
            }
            continue;
        }
        if let Some(entry) = found.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value.to_string();
        } else {
            found.push((name, value.to_string()));
        }
    }

    let mut result = Extraction::new();
    if let Some(url) = url {
        result.insert("url".to_string(), Value::String(url));
    }
    for name in &shape.capture {
        // A URL always wins the `url` key over a same-named attribute
        if name == "url" && result.contains_key("url") {
            continue;
        }
        if let Some((_, value)) = found.iter().find(|(n, _)| n == name) {
            result.insert(name.clone(), Value::String(value.clone()));
        }
    }

    Some(result)
}

fn extract_bare_url(raw: &str, shape: &ElementShape) -> Option<Extraction> {
    if !shape.accept_bare_url {
        return None;
    }

    let trimmed = raw.trim();
    if trimmed.contains(char::is_whitespace) || trimmed.contains('<') || !shape.is_url(trimmed) {
        return None;
    }

    let mut result = Extraction::new();
    result.insert("url".to_string(), Value::String(trimmed.to_string()));
    Some(result)
}
