//! Widget loader extraction
//!
//! Some widgets are embedded as a loader script whose query string carries the
//! configuration:
//!
//! ```html
//! <script type='text/javascript' src='//www.opentable.com/widget/reservation/loader?rid=412810&amp;domain=com&amp;lang=en-US'></script>
//! ```
//!
//! The script pair is matched with a pattern first; only the matched fragment
//! is handed to the HTML parser to read the entity-decoded `src`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use super::Extraction;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b(?:"[^"]*"|'[^']*'|[^'">])*>\s*</script\s*>"#)
        .expect("Invalid script regex")
});

/// How a query parameter is turned into a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// First occurrence, as a string
    Text,
    /// Every occurrence, comma-split and de-duplicated, as a list of strings
    List,
    /// Presence flag; `""`, `"false"` and `"0"` read as false
    Flag,
}

/// Mapping of one query parameter onto an extraction key
#[derive(Debug, Clone)]
pub struct LoaderParam {
    pub query: String,
    pub key: String,
    pub kind: ParamKind,
    /// Only fill `key` when an earlier param left it absent or empty
    pub fallback: bool,
}

impl LoaderParam {
    pub fn new(query: &str, key: &str, kind: ParamKind) -> Self {
        Self {
            query: query.to_string(),
            key: key.to_string(),
            kind,
            fallback: false,
        }
    }

    pub fn fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

/// Loader shape: accepted hosts, loader path and parameter mapping
#[derive(Debug, Clone)]
pub struct LoaderShape {
    host_pattern: Regex,
    path: String,
    params: Vec<LoaderParam>,
    required: Vec<String>,
}

impl LoaderShape {
    pub fn new(host_pattern: &str, path: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            host_pattern: Regex::new(host_pattern)?,
            path: path.to_string(),
            params: Vec::new(),
            required: Vec::new(),
        })
    }

    pub fn param(mut self, param: LoaderParam) -> Self {
        self.params.push(param);
        self
    }

    /// Key that must end up present and non-empty for the embed to match
    pub fn require(mut self, key: &str) -> Self {
        self.required.push(key.to_string());
        self
    }
}

/// Extract the configured query parameters from a loader script embed
pub fn extract_loader(raw: &str, shape: &LoaderShape) -> Option<Extraction> {
    SCRIPT_RE
        .find_iter(raw)
        .find_map(|m| extract_script(m.as_str(), shape))
}

fn extract_script(fragment: &str, shape: &LoaderShape) -> Option<Extraction> {
    let src = script_src(fragment)?;
    let url = parse_src(&src)?;

    let host = url.host_str()?;
    if !shape.host_pattern.is_match(host) || url.path().trim_end_matches('/') != shape.path {
        return None;
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.trim().to_string()))
        .collect();

    let mut result = Extraction::new();
    for param in &shape.params {
        let mut values = pairs
            .iter()
            .filter(|(k, _)| *k == param.query)
            .map(|(_, v)| v.as_str());

        let filled = match result.get(&param.key) {
            Some(Value::Array(list)) => !list.is_empty(),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
            None => false,
        };
        if param.fallback && filled {
            continue;
        }

        match param.kind {
            ParamKind::Text => {
                if let Some(v) = values.next() {
                    result
                        .entry(param.key.clone())
                        .or_insert_with(|| Value::String(v.to_string()));
                }
            }
            ParamKind::List => {
                let entry = result
                    .entry(param.key.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(list) = entry {
                    for item in values.flat_map(|v| v.split(',')).map(str::trim) {
                        if item.is_empty() {
                            continue;
                        }
                        let item = Value::String(item.to_string());
                        if !list.contains(&item) {
                            list.push(item);
                        }
                    }
                }
            }
            ParamKind::Flag => {
                if let Some(v) = values.next() {
                    let on = !matches!(v.to_ascii_lowercase().as_str(), "" | "false" | "0");
                    result.insert(param.key.clone(), Value::Bool(on));
                }
            }
        }
    }

    // Lists nobody filled are not "found"
    result.retain(|_, v| !matches!(v, Value::Array(list) if list.is_empty()));

    if shape.required.iter().any(|key| !result.contains_key(key)) {
        return None;
    }

    Some(result)
}

fn script_src(fragment: &str) -> Option<String> {
    let document = Html::parse_fragment(fragment);
    let selector = Selector::parse("script[src]").ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("src"))
        .map(|s| s.trim().to_string())
}

fn parse_src(src: &str) -> Option<Url> {
    // Loader snippets are usually protocol-relative
    let absolute = if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape() -> LoaderShape {
        LoaderShape::new(r"^(www\.)?opentable(\.[a-z]{2,3}){1,2}$", "/widget/reservation/loader")
            .unwrap()
            .param(LoaderParam::new("rid", "rid", ParamKind::List))
            .param(LoaderParam::new("restref", "rid", ParamKind::List).fallback())
            .param(LoaderParam::new("lang", "lang", ParamKind::Text))
            .param(LoaderParam::new("iframe", "iframe", ParamKind::Flag))
            .param(LoaderParam::new("newtab", "newtab", ParamKind::Flag))
            .require("rid")
    }

    #[test]
    fn test_extract_loader_with_escaped_query() {
        let html = "<script type='text/javascript' src='//www.opentable.com/widget/reservation/loader?rid=412810&amp;rid=1234&amp;lang=fr-CA&amp;iframe=true&amp;newtab=false'></script>";

        let result = extract_loader(html, &shape()).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({
                "rid": ["412810", "1234"],
                "lang": "fr-CA",
                "iframe": true,
                "newtab": false,
            })
        );
    }

    #[test]
    fn test_rid_lists_are_split_and_deduplicated() {
        let html = r#"<script src="https://www.opentable.co.uk/widget/reservation/loader?restref=99&rid=99,100"></script>"#;

        let result = extract_loader(html, &shape()).unwrap();
        assert_eq!(result["rid"], json!(["99", "100"]));
    }

    #[test]
    fn test_restref_ignored_when_rid_present() {
        let html = "<script src='//www.opentable.com/widget/reservation/loader?rid=1&amp;restref=2'></script>";

        let result = extract_loader(html, &shape()).unwrap();
        assert_eq!(result["rid"], json!(["1"]));
    }

    #[test]
    fn test_restref_only() {
        let html = "<script src='//www.opentable.com/widget/reservation/loader?restref=2&amp;rid='></script>";

        let result = extract_loader(html, &shape()).unwrap();
        assert_eq!(result["rid"], json!(["2"]));
    }

    #[test]
    fn test_loader_after_other_scripts() {
        let html = "<script>window.x = 1;</script>\n<script src='//cdn.example.com/lib.js'></script>\n<script src='//www.opentable.com/widget/reservation/loader?rid=5'></script>";

        let result = extract_loader(html, &shape()).unwrap();
        assert_eq!(result["rid"], json!(["5"]));
    }

    #[test]
    fn test_wrong_host_or_path_is_no_match() {
        let wrong_host = "<script src='//www.example.com/widget/reservation/loader?rid=1'></script>";
        let wrong_path = "<script src='//www.opentable.com/other?rid=1'></script>";
        assert!(extract_loader(wrong_host, &shape()).is_none());
        assert!(extract_loader(wrong_path, &shape()).is_none());
    }

    #[test]
    fn test_missing_required_is_no_match() {
        let html = "<script src='//www.opentable.com/widget/reservation/loader?lang=en-US'></script>";
        assert!(extract_loader(html, &shape()).is_none());
    }

    #[test]
    fn test_unclosed_script_is_no_match() {
        let html = "<script src='//www.opentable.com/widget/reservation/loader?rid=1'>";
        assert!(extract_loader(html, &shape()).is_none());
    }
}
