//! Attribute validation
//!
//! Reconciles an arbitrary attribute mapping against an [`AttributeSchema`].
//! The output always has exactly the schema's keys, in schema order: valid
//! values are kept, invalid or missing ones fall back to the default and
//! unknown keys are dropped.

use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::schema::{AttributeSchema, AttributeSpec, AttributeType, ItemConstraint};

/// Normalize `candidate` so that it conforms to `schema`
pub fn validate(candidate: &Map<String, Value>, schema: &AttributeSchema) -> Map<String, Value> {
    for key in candidate.keys().filter(|k| !schema.contains(k)) {
        debug!(attribute = %key, "dropping attribute not declared in schema");
    }

    schema
        .iter()
        .map(|(name, spec)| {
            let value = match candidate.get(name) {
                Some(value) => coerce(spec, value).unwrap_or_else(|| {
                    trace!(attribute = name, %value, "invalid value, using default");
                    spec.default.clone()
                }),
                None => spec.default.clone(),
            };
            (name.to_string(), value)
        })
        .collect()
}

/// Like [`validate`], for a candidate that may not even be an object
pub fn validate_value(candidate: &Value, schema: &AttributeSchema) -> Map<String, Value> {
    match candidate {
        Value::Object(map) => validate(map, schema),
        other => {
            debug!(candidate = %other, "candidate attributes are not an object");
            schema.defaults()
        }
    }
}

/// Coerce a single value to its spec, or `None` if it cannot be kept
pub(crate) fn coerce(spec: &AttributeSpec, value: &Value) -> Option<Value> {
    if *value == spec.default {
        return Some(value.clone());
    }

    let coerced = match spec.kind {
        AttributeType::String => {
            let s = value.as_str()?;
            if let Some(pattern) = &spec.pattern {
                if !pattern.is_match(s) {
                    return None;
                }
            }
            Value::String(s.to_string())
        }
        AttributeType::Boolean => Value::Bool(is_truthy(value)),
        AttributeType::Integer => match value {
            Value::Number(n) => Value::Number(Number::from(n.as_i64()?)),
            Value::String(s) => Value::Number(Number::from(s.trim().parse::<i64>().ok()?)),
            _ => return None,
        },
        AttributeType::Array => {
            let items = value.as_array()?;
            Value::Array(
                items
                    .iter()
                    .filter_map(|item| coerce_item(spec.items, item))
                    .collect(),
            )
        }
    };

    spec.is_allowed(&coerced).then_some(coerced)
}

fn coerce_item(constraint: ItemConstraint, item: &Value) -> Option<Value> {
    match constraint {
        ItemConstraint::Any => item.is_string().then(|| item.clone()),
        ItemConstraint::Numeric => match item {
            Value::String(s) if is_identifier(s) => Some(item.clone()),
            Value::Number(n) => n.as_u64().map(|id| Value::String(id.to_string())),
            _ => {
                trace!(%item, "dropping invalid list element");
                None
            }
        },
    }
}

/// Plausible identifier token: non-empty, ASCII digits only
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Truthiness the way the block editor coerces toggles
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
