//! Embed code parser for block editor integrations
//!
//! Turns pasted third-party embed snippets into block attributes:
//! - Element embeds (`<iframe src=... width=... height=...></iframe>`)
//! - Restaurant identifiers (`12345`, `Name (ID:12345)`)
//! - Widget loader scripts with query-string configuration
//!
//! Extracted fields are then normalized against a per-integration schema, so
//! the attributes handed back always have exactly the schema's keys.

pub mod error;
pub mod extractors;
pub mod ffi;
pub mod integrations;
pub mod schema;
pub mod validator;

pub use error::*;
pub use extractors::{extract, Extraction, ShapeDescriptor};
pub use ffi::*;
pub use integrations::Integration;
pub use schema::{AttributeSchema, AttributeSpec, AttributeType, ItemConstraint};
pub use validator::{validate, validate_value};
