//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The intermediate SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// The raster target could not be allocated.
    #[error("Failed to create {width}x{height} pixmap")]
    Pixmap {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Image encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// A display list could not be serialized.
    #[error("Display list serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
