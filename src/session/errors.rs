//! Error types for DOM session operations

/// Failure of a single session command
///
/// "Nothing matched" is not an error: queries report it as `Ok(None)` or
/// an empty list. These variants are the unexpected cases.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// Node handle no longer points into the current document
    #[error("Stale node handle {node} (page navigated or node detached)")]
    Stale { node: String },

    /// Locator expression rejected by the query engine
    #[error("Invalid locator '{expression}': {message}")]
    InvalidLocator { expression: String, message: String },

    /// The session cannot evaluate this kind of locator
    #[error("Unsupported locator: {0}")]
    Unsupported(String),

    /// Browser, target or connection is gone
    #[error("Session closed: {0}")]
    Closed(String),

    /// Any other protocol or evaluation failure
    #[error("Session protocol error: {0}")]
    Protocol(String),
}

/// Phrases chromiumoxide and the browser use once the target or connection is gone
const CONNECTION_LOST: &[&str] = &[
    "browser closed",
    "browser disconnected",
    "page closed",
    "target closed",
    "session closed",
    "connection closed",
    "no response from the chromium instance",
    "send failed because receiver is gone",
];

impl SessionError {
    /// Fatal errors end the run; everything else is absorbed per field or entity.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Closed(_))
    }

    /// Errors that only disqualify one locator candidate, not the whole chain.
    #[must_use]
    pub fn skips_candidate(&self) -> bool {
        matches!(
            self,
            SessionError::Unsupported(_) | SessionError::InvalidLocator { .. }
        )
    }

    /// Classify a raw browser error message.
    ///
    /// Only whole connection-loss phrases count as closed. URLs and
    /// selectors quoted inside a message never decide the class.
    #[must_use]
    pub fn from_browser_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if CONNECTION_LOST.iter().any(|phrase| lower.contains(phrase)) {
            return SessionError::Closed(message);
        }

        if lower.contains("could not find node") || lower.contains("detached") {
            return SessionError::Stale { node: message };
        }

        SessionError::Protocol(message)
    }
}
