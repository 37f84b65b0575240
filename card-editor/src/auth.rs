//! Auth Provider interface.
//!
//! Login and registration live outside the editor. The editor only needs a
//! bearer credential for card store calls and a signal telling it whether a
//! session is active.

use std::sync::{PoisonError, RwLock};

/// Source of the identity token attached to card store calls.
pub trait AuthProvider: Send + Sync {
    /// Bearer credential of the active session, if any.
    fn bearer_token(&self) -> Option<String>;

    /// Whether a session is active.
    fn is_session_active(&self) -> bool {
        self.bearer_token().is_some()
    }

    /// Drop the session after the store rejected its credential.
    fn invalidate(&self);
}

/// Auth provider backed by a token handed over by the host.
#[derive(Debug, Default)]
pub struct TokenAuth {
    token: RwLock<Option<String>>,
}

impl TokenAuth {
    /// Provider with an active session using `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Provider without a session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Start a session with `token`, replacing any previous one.
    pub fn set_token(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token.into());
    }
}

impl AuthProvider for TokenAuth {
    fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|t| !t.is_empty())
    }

    fn invalidate(&self) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::info!("Session credential rejected; signed out");
        }
    }
}
