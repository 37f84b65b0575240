//! Editor and card store error types.

use card_core::CardError;
use card_renderer::RenderError;
use thiserror::Error;

use crate::store::CardId;

/// Result type for card store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for editor session operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur when talking to the card store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured base URL is invalid.
    #[error("invalid card store URL: {0}")]
    InvalidUrl(String),

    /// HTTP layer failed (connection, timeout, etc.).
    #[error("card store HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The credential was missing, invalid or expired.
    #[error("card store rejected the credential")]
    Unauthorized,

    /// The card does not exist or belongs to another account.
    #[error("card not found: {0}")]
    NotFound(CardId),

    /// The response did not match the expected structure.
    #[error("unexpected card store response: {0}")]
    UnexpectedResponse(String),

    /// JSON parsing failed unexpectedly.
    #[error("failed to parse card store payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the session credential should be dropped.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Errors surfaced by editor actions.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A save-dependent action was attempted without an active session.
    #[error("no active session")]
    NotAuthenticated,

    /// The card store call failed.
    #[error(transparent)]
    Store(StoreError),

    /// Export failed.
    #[error("export failed: {0}")]
    Render(#[from] RenderError),

    /// Scene or card document error.
    #[error(transparent)]
    Document(#[from] CardError),
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        if err.is_unauthorized() {
            Self::NotAuthenticated
        } else {
            Self::Store(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_not_authenticated() {
        let err = EditorError::from(StoreError::Unauthorized);
        assert!(matches!(err, EditorError::NotAuthenticated));
    }

    #[test]
    fn test_other_store_errors_are_wrapped() {
        let err = EditorError::from(StoreError::NotFound(CardId::from("7")));
        assert!(matches!(err, EditorError::Store(StoreError::NotFound(_))));
        assert_eq!(err.to_string(), "card not found: 7");
    }
}
