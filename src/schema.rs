//! Attribute schemas
//!
//! A schema lists the attributes an integration stores, in order, with their
//! type, default and optional constraints. Schemas are static configuration,
//! loaded from JSON such as:
//!
//! ```json
//! {
//!   "style": { "type": "string", "default": "standard", "enum": ["standard", "tall"] },
//!   "rid": { "type": "array", "default": [], "items": "numeric" }
//! }
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Storage type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Boolean,
    Integer,
    Array,
}

/// Constraint applied to every element of an array attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemConstraint {
    /// Any string element
    #[default]
    Any,
    /// Identifier token made of ASCII digits
    Numeric,
}

/// Raw attribute entry as written in configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct AttributeConfig {
    #[serde(rename = "type")]
    kind: AttributeType,
    default: Value,
    #[serde(default, rename = "enum")]
    allowed_values: Option<Vec<Value>>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    items: ItemConstraint,
}

/// Compiled description of one attribute
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub kind: AttributeType,
    pub default: Value,
    pub allowed_values: Option<Vec<Value>>,
    pub pattern: Option<Regex>,
    pub items: ItemConstraint,
}

impl AttributeSpec {
    pub fn new(kind: AttributeType, default: Value) -> Self {
        Self {
            kind,
            default,
            allowed_values: None,
            pattern: None,
            items: ItemConstraint::Any,
        }
    }

    pub fn allowed_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.allowed_values = Some(values.into_iter().collect());
        self
    }

    pub fn items(mut self, items: ItemConstraint) -> Self {
        self.items = items;
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// The default must have the declared type and belong to the enum.
    /// Patterns are not applied to defaults, an empty string default means unset.
    fn default_fits(&self) -> bool {
        let type_ok = match self.kind {
            AttributeType::String => self.default.is_string(),
            AttributeType::Boolean => self.default.is_boolean(),
            AttributeType::Integer => self.default.is_i64(),
            AttributeType::Array => self.default.is_array(),
        };
        type_ok && self.is_allowed(&self.default)
    }

    /// Whether `value` is acceptable as-is under the declared enum
    pub fn is_allowed(&self, value: &Value) -> bool {
        match &self.allowed_values {
            Some(values) => values.contains(value),
            None => true,
        }
    }
}

/// Ordered mapping from attribute name to its spec
#[derive(Debug, Clone, Default)]
pub struct AttributeSchema {
    attributes: Vec<(String, AttributeSpec)>,
}

impl AttributeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, checking that its default satisfies its own constraints.
    /// Re-declaring a name replaces the earlier spec in place.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        spec: AttributeSpec,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if !spec.default_fits() {
            return Err(SchemaError::DefaultViolatesSchema(name));
        }

        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = spec,
            None => self.attributes.push((name, spec)),
        }
        Ok(self)
    }

    /// Load a schema from a JSON object, preserving key order
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let raw: Map<String, Value> = serde_json::from_str(json)?;
        let mut schema = Self::new();

        for (name, entry) in raw {
            let config: AttributeConfig = serde_json::from_value(entry)?;
            let pattern = match config.pattern {
                Some(p) => Some(Regex::new(&p).map_err(|e| SchemaError::InvalidPattern {
                    attribute: name.clone(),
                    message: e.to_string(),
                })?),
                None => None,
            };

            let spec = AttributeSpec {
                kind: config.kind,
                default: config.default,
                allowed_values: config.allowed_values,
                pattern,
                items: config.items,
            };
            schema = schema.with_attribute(name, spec)?;
        }

        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeSpec)> {
        self.attributes.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Every attribute set to its default
    pub fn defaults(&self) -> Map<String, Value> {
        self.iter()
            .map(|(name, spec)| (name.to_string(), spec.default.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_order() {
        let schema = AttributeSchema::from_json(
            r#"{
                "zeta": { "type": "string", "default": "" },
                "alpha": { "type": "boolean", "default": true },
                "mid": { "type": "array", "default": [], "items": "numeric" }
            }"#,
        )
        .unwrap();

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(schema.get("mid").unwrap().items, ItemConstraint::Numeric);
        assert_eq!(schema.get("alpha").unwrap().default, json!(true));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = AttributeSchema::from_json(
            r#"{ "url": { "type": "string", "default": "", "pattern": "([" } }"#,
        )
        .unwrap_err();

        assert!(matches!(err, SchemaError::InvalidPattern { ref attribute, .. } if attribute == "url"));
    }

    #[test]
    fn test_default_outside_enum_rejected() {
        let err = AttributeSchema::from_json(
            r#"{ "lang": { "type": "string", "default": "xx", "enum": ["en-US"] } }"#,
        )
        .unwrap_err();

        assert!(matches!(err, SchemaError::DefaultViolatesSchema(ref name) if name == "lang"));
    }

    #[test]
    fn test_unknown_type_is_json_error() {
        let err = AttributeSchema::from_json(r#"{ "x": { "type": "float", "default": 1 } }"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidJson(_)));
    }

    #[test]
    fn test_builder_replaces_existing() {
        let schema = AttributeSchema::new()
            .with_attribute("width", AttributeSpec::new(AttributeType::Integer, json!(800)))
            .unwrap()
            .with_attribute("width", AttributeSpec::new(AttributeType::Integer, json!(600)))
            .unwrap();

        assert_eq!(schema.len(), 1);
        assert_eq!(schema.defaults()["width"], json!(600));
    }
}
