//! Locator value types
//!
//! A `LocatorSpec` is one way of finding a node below a scope. An ordered
//! list of them forms the fallback chain of a field.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Query language of a locator expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    Css,
    Xpath,
}

impl LocatorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LocatorKind::Css => "css",
            LocatorKind::Xpath => "xpath",
        }
    }

    /// Guess the kind of a bare catalog string.
    ///
    /// Strings with an explicit `xpath:` / `css:` prefix use that kind;
    /// strings starting with `/` or `(` are XPath; everything else is CSS.
    #[must_use]
    pub fn infer(expression: &str) -> (LocatorKind, &str) {
        let trimmed = expression.trim();
        if let Some(rest) = trimmed.strip_prefix("xpath:") {
            (LocatorKind::Xpath, rest.trim())
        } else if let Some(rest) = trimmed.strip_prefix("css:") {
            (LocatorKind::Css, rest.trim())
        } else if trimmed.starts_with('/') || trimmed.starts_with('(') {
            (LocatorKind::Xpath, trimmed)
        } else {
            (LocatorKind::Css, trimmed)
        }
    }
}

/// What to read from a located node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "read", content = "name")]
pub enum ReadMode {
    /// Rendered text, trimmed
    Text,
    /// Value of the named attribute (URL-valued attributes come back absolute)
    Attribute(String),
}

impl ReadMode {
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        ReadMode::Attribute(name.into())
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadMode::Text => f.write_str("text"),
            ReadMode::Attribute(name) => write!(f, "@{name}"),
        }
    }
}

/// One candidate locator of a fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorSpec {
    pub kind: LocatorKind,
    pub expression: String,
    pub mode: ReadMode,
    pub wait_timeout_ms: u64,
    /// Require the node to be rendered (non-zero box) before it counts as found
    #[serde(default)]
    pub require_visible: bool,
}

impl LocatorSpec {
    #[must_use]
    pub fn css(expression: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Css,
            expression: expression.into(),
            mode: ReadMode::Text,
            wait_timeout_ms: crate::utils::DEFAULT_WAIT_TIMEOUT_MS,
            require_visible: false,
        }
    }

    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Xpath,
            ..Self::css(expression)
        }
    }

    #[must_use]
    pub fn read(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn wait_ms(mut self, timeout_ms: u64) -> Self {
        self.wait_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn visible(mut self, require_visible: bool) -> Self {
        self.require_visible = require_visible;
        self
    }

    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

impl fmt::Display for LocatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} [{}]", self.kind.as_str(), self.expression, self.mode)
    }
}

/// Ordered, non-empty list of candidates for one logical target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LocatorSpec>")]
pub struct LocatorChain(Vec<LocatorSpec>);

impl TryFrom<Vec<LocatorSpec>> for LocatorChain {
    type Error = &'static str;

    fn try_from(candidates: Vec<LocatorSpec>) -> Result<Self, Self::Error> {
        Self::new(candidates).ok_or("locator chain needs at least one candidate")
    }
}

impl LocatorChain {
    /// Build a chain; `None` when `candidates` is empty.
    #[must_use]
    pub fn new(candidates: Vec<LocatorSpec>) -> Option<Self> {
        if candidates.is_empty() {
            None
        } else {
            Some(Self(candidates))
        }
    }

    #[must_use]
    pub fn single(spec: LocatorSpec) -> Self {
        Self(vec![spec])
    }

    #[must_use]
    pub fn candidates(&self) -> &[LocatorSpec] {
        &self.0
    }

    #[must_use]
    pub fn first(&self) -> &LocatorSpec {
        // Non-empty by construction
        &self.0[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same chain with every wait capped at `timeout_ms`.
    #[must_use]
    pub fn capped_wait(&self, timeout_ms: u64) -> Self {
        Self(
            self.0
                .iter()
                .cloned()
                .map(|spec| {
                    let capped = spec.wait_timeout_ms.min(timeout_ms);
                    spec.wait_ms(capped)
                })
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a LocatorChain {
    type Item = &'a LocatorSpec;
    type IntoIter = std::slice::Iter<'a, LocatorSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
