use thiserror::Error;

/// Errors raised while interpreting a property definition document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The property definition is not a JSON object
    #[error("Property definition for \"{property}\" is not an object")]
    NotAnObject { property: String },

    /// The property definition has no usable `type` member
    #[error("Property definition for \"{property}\" has no type")]
    MissingType { property: String },

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
