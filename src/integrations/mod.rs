//! Built-in embed integrations
//!
//! Each integration pairs a static shape descriptor with a static attribute
//! schema. [`Integration::parse_embed`] runs the whole pipeline:
//! pasted text, then extraction, then validation.

pub mod google_calendar;
pub mod opentable;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::EmbedError;
use crate::extractors::{extract, ShapeDescriptor};
use crate::schema::AttributeSchema;
use crate::validator::{validate, validate_value};

/// A supported third-party embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    GoogleCalendar,
    OpenTable,
}

impl Integration {
    pub const ALL: [Integration; 2] = [Integration::GoogleCalendar, Integration::OpenTable];

    pub fn name(&self) -> &'static str {
        match self {
            Integration::GoogleCalendar => "google-calendar",
            Integration::OpenTable => "opentable",
        }
    }

    pub fn shape(&self) -> &'static ShapeDescriptor {
        match self {
            Integration::GoogleCalendar => google_calendar::shape(),
            Integration::OpenTable => opentable::shape(),
        }
    }

    pub fn schema(&self) -> &'static AttributeSchema {
        match self {
            Integration::GoogleCalendar => google_calendar::schema(),
            Integration::OpenTable => opentable::schema(),
        }
    }

    /// Turn pasted embed text into schema-conformant attributes
    pub fn parse_embed(&self, raw: &str) -> Result<Map<String, Value>, EmbedError> {
        let mut fields = extract(raw, self.shape())?;
        if let Integration::OpenTable = self {
            opentable::apply_widget_type(&mut fields);
        }
        Ok(validate(&fields, self.schema()))
    }

    /// Normalize previously stored attributes
    pub fn normalize(&self, stored: &Value) -> Map<String, Value> {
        validate_value(stored, self.schema())
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Integration {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Integration::ALL
            .into_iter()
            .find(|i| i.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EmbedError::UnknownIntegration(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_str() {
        assert_eq!("opentable".parse::<Integration>().unwrap(), Integration::OpenTable);
        assert_eq!(" Google-Calendar ".parse::<Integration>().unwrap(), Integration::GoogleCalendar);
        assert!(matches!(
            "amazon".parse::<Integration>(),
            Err(EmbedError::UnknownIntegration(ref name)) if name == "amazon"
        ));
    }

    #[test]
    fn test_builtin_schemas_load() {
        for integration in Integration::ALL {
            assert!(!integration.schema().is_empty(), "{integration}");
        }
    }

    #[test]
    fn test_parse_embed_closes_over_schema_keys() {
        let inputs = [
            r#"<iframe src="https://calendar.google.com/calendar/embed?src=abc" width="800" height="600" frameborder="0"></iframe>"#,
            "12345",
            "Trattoria Roma (ID:98765)",
            "<script src='//www.opentable.com/widget/reservation/loader?rid=1&type=button'></script>",
        ];

        for integration in Integration::ALL {
            let keys: Vec<&str> = integration.schema().keys().collect();
            for input in inputs {
                if let Ok(attributes) = integration.parse_embed(input) {
                    let got: Vec<&str> = attributes.keys().map(String::as_str).collect();
                    assert_eq!(got, keys);
                }
            }
        }
    }

    #[test]
    fn test_no_match_surfaces_as_error() {
        for integration in Integration::ALL {
            let result = integration.parse_embed("not an embed at all");
            assert!(matches!(result, Err(EmbedError::NoMatch)));
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let stored = json!({ "rid": ["1", "x"], "style": "huge", "lang": "fr-CA", "old": 1 });
        let once = Integration::OpenTable.normalize(&stored);
        let twice = Integration::OpenTable.normalize(&Value::Object(once.clone()));
        assert_eq!(once, twice);
    }
}
