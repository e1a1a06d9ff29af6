//! Caller-level errors of the extraction engine
//!
//! Field and entity failures never surface here; they end up as sentinels
//! or status records. These variants stop a whole run.

use crate::registry::{EntityDomain, RegistryError};
use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The browser session went away mid-run
    #[error("Session closed during extraction: {0}")]
    SessionClosed(#[source] SessionError),

    /// A non-fatal session error outside per-field extraction (node collection)
    #[error("Session error: {0}")]
    Session(#[source] SessionError),

    #[error("{0} has no item locator; it is extracted at page scope")]
    NoItemLocator(EntityDomain),

    #[error("Invalid short-form URL pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl EngineError {
    /// Wrap a session error, separating the fatal case.
    #[must_use]
    pub fn from_session(error: SessionError) -> Self {
        if error.is_fatal() {
            EngineError::SessionClosed(error)
        } else {
            EngineError::Session(error)
        }
    }

    #[must_use]
    pub fn is_session_closed(&self) -> bool {
        matches!(self, EngineError::SessionClosed(_))
    }
}
