//! Result types of a single field extraction

use serde::{Serialize, Serializer};

use crate::session::SessionError;

/// What happened when one field was resolved against one scope
#[derive(Debug, Clone)]
pub enum FieldOutcome {
    /// A candidate matched; value after transform
    Found(String),
    /// Every candidate expired
    NotFound,
    /// The entity itself is removed or restricted
    Unavailable,
    /// Unexpected session failure; recorded as the sentinel
    Fault(SessionError),
}

impl FieldOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, FieldOutcome::Found(_))
    }

    /// Fatal faults must end the run instead of becoming a sentinel.
    #[must_use]
    pub fn fatal_error(&self) -> Option<&SessionError> {
        match self {
            FieldOutcome::Fault(e) if e.is_fatal() => Some(e),
            _ => None,
        }
    }

    /// Collapse into the value stored in a record.
    #[must_use]
    pub fn into_value(self, sentinel: &str) -> FieldValue {
        match self {
            FieldOutcome::Found(text) => FieldValue::Text(text),
            FieldOutcome::NotFound | FieldOutcome::Fault(_) => FieldValue::Missing {
                sentinel: sentinel.to_string(),
            },
            FieldOutcome::Unavailable => FieldValue::Null,
        }
    }
}

/// Value of one record field
///
/// `Missing` serializes as its sentinel string, so a field that was not
/// found and a field that was found empty stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Missing { sentinel: String },
    Null,
}

impl FieldValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// The found text; `None` for sentinels and nulls.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing { .. })
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text as written to output: found text, sentinel, or `None` for null
    #[must_use]
    pub fn as_output(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Missing { sentinel } => Some(sentinel),
            FieldValue::Null => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_output() {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_none(),
        }
    }
}
