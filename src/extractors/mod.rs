//! Embed snippet extractors
//!
//! Each module recognizes one family of pasted embed shapes and pulls the
//! structured fields out of it. None of them raise on malformed input: a
//! snippet either matches its shape completely or yields [`EmbedError::NoMatch`].

mod element_extractor;
mod identifier_extractor;
mod loader_extractor;

pub use element_extractor::*;
pub use identifier_extractor::*;
pub use loader_extractor::*;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::EmbedError;

/// Fields pulled out of a matched snippet, keyed by attribute name
pub type Extraction = Map<String, Value>;

/// Which embed shape an integration expects
#[derive(Debug, Clone)]
pub enum ShapeDescriptor {
    /// An element pair such as `<iframe ...></iframe>`
    Element(ElementShape),
    /// A bare numeric id or a label ending in `(ID:<id>)`
    Identifier(IdentifierShape),
    /// A widget loader `<script src="...?params"></script>`
    Loader(LoaderShape),
    /// First listed shape that matches wins
    OneOf(Vec<ShapeDescriptor>),
}

impl ShapeDescriptor {
    fn name(&self) -> &'static str {
        match self {
            ShapeDescriptor::Element(_) => "element",
            ShapeDescriptor::Identifier(_) => "identifier",
            ShapeDescriptor::Loader(_) => "loader",
            ShapeDescriptor::OneOf(_) => "one_of",
        }
    }

    fn try_extract(&self, raw: &str) -> Option<Extraction> {
        match self {
            ShapeDescriptor::Element(shape) => extract_element(raw, shape),
            ShapeDescriptor::Identifier(shape) => extract_identifier(raw, shape),
            ShapeDescriptor::Loader(shape) => extract_loader(raw, shape),
            ShapeDescriptor::OneOf(shapes) => shapes.iter().find_map(|s| s.try_extract(raw)),
        }
    }
}

/// Match `raw` against `shape` and return the extracted fields
pub fn extract(raw: &str, shape: &ShapeDescriptor) -> Result<Extraction, EmbedError> {
    if raw.trim().is_empty() {
        debug!(shape = shape.name(), "empty embed input");
        return Err(EmbedError::NoMatch);
    }

    match shape.try_extract(raw) {
        Some(fields) => {
            debug!(shape = shape.name(), fields = fields.len(), "embed matched");
            Ok(fields)
        }
        None => {
            debug!(shape = shape.name(), "embed did not match");
            Err(EmbedError::NoMatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn calendar_iframe() -> ShapeDescriptor {
        ShapeDescriptor::Element(
            ElementShape::new(
                "iframe",
                r"^\s*https?://calendar\.google\.com/calendar",
                ["width", "height"],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_empty_input_is_no_match() {
        assert!(matches!(extract("", &calendar_iframe()), Err(EmbedError::NoMatch)));
        assert!(matches!(extract("  \n\t", &calendar_iframe()), Err(EmbedError::NoMatch)));
    }

    #[test]
    fn test_unrelated_text_is_no_match() {
        let result = extract("not an embed at all", &calendar_iframe());
        assert!(matches!(result, Err(EmbedError::NoMatch)));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let html = r#"<iframe src="https://calendar.google.com/calendar/embed?src=abc" width="800" height="600" frameborder="0"></iframe>"#;
        let shape = calendar_iframe();

        let first = extract(html, &shape).unwrap();
        let second = extract(html, &shape).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            Value::Object(first),
            json!({
                "url": "https://calendar.google.com/calendar/embed?src=abc",
                "width": "800",
                "height": "600",
            })
        );
    }

    #[test]
    fn test_one_of_uses_first_match() {
        let shape = ShapeDescriptor::OneOf(vec![
            ShapeDescriptor::Identifier(IdentifierShape::new("rid")),
            calendar_iframe(),
        ]);

        assert_eq!(extract("42", &shape).unwrap()["rid"], json!(["42"]));
        assert!(extract(
            r#"<iframe src="https://calendar.google.com/calendar/embed"></iframe>"#,
            &shape
        )
        .unwrap()
        .contains_key("url"));
        assert!(matches!(extract("nothing", &shape), Err(EmbedError::NoMatch)));
    }
}
