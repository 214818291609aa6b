//! Error types

/// Errors surfaced by embed parsing
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// The pasted text does not have the expected embed shape
    #[error("no match")]
    NoMatch,

    #[error("Unknown integration: {0}")]
    UnknownIntegration(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised while loading an attribute schema from configuration
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid schema JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid pattern for attribute {attribute}: {message}")]
    InvalidPattern { attribute: String, message: String },

    #[error("Default value of attribute {0} does not satisfy its own schema")]
    DefaultViolatesSchema(String),
}
