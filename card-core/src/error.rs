//! Error types for scene operations.

use thiserror::Error;

/// Result type for scene operations.
pub type CardResult<T> = Result<T, CardError>;

/// Errors that can occur in scene operations.
#[derive(Debug, Error)]
pub enum CardError {
    /// Object not found in scene.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// No template with the given identifier exists.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
