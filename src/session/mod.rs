//! DOM session abstraction
//!
//! The engine never talks to a browser directly. Everything it needs from
//! the page goes through [`DomSession`]: scoped queries, text and attribute
//! reads, clicks, scrolling, progress measurement and navigation. Every
//! command is a single bounded probe; waiting is the engine's job.
//!
//! Two implementations ship with the crate:
//! - [`ChromeSession`] drives a live chromiumoxide `Page`
//! - [`HtmlSnapshotSession`] replays captured HTML frames offline

pub mod chrome;
pub mod errors;
pub mod js_scripts;
pub mod snapshot;

pub use chrome::{ChromeNode, ChromeSession};
pub use errors::SessionError;
pub use snapshot::{HtmlSnapshotSession, SnapshotNode};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::LocatorSpec;

/// Where a query starts: the whole document or one collected node
#[derive(Debug)]
pub enum Scope<'a, N> {
    Page,
    Node(&'a N),
}

impl<N> Clone for Scope<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Scope<'_, N> {}

impl<N: fmt::Debug> fmt::Display for Scope<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Page => f.write_str("page"),
            Scope::Node(node) => write!(f, "node {node:?}"),
        }
    }
}

/// One pagination step
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ScrollAction {
    /// One viewport down, like pressing Page Down
    #[default]
    PageDown,
    /// Fixed pixel offset
    By { pixels: i64 },
    /// Jump to the current bottom of the document
    ToBottom,
}

/// Monotonic measure of how much content the page has rendered
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "signal")]
pub enum ProgressSignal {
    /// `window.pageYOffset`
    #[default]
    VerticalOffset,
    /// `document.documentElement.scrollHeight`
    DocumentHeight,
    /// Number of nodes matching a locator
    ItemCount { locator: LocatorSpec },
}

/// Query/read/scroll/navigate surface of a browser page
///
/// Implementations report absence as `Ok(None)`, `Ok(false)` or an empty
/// list. `Err` is reserved for unexpected failures; see [`SessionError`].
/// Node handles are only valid until the next [`DomSession::navigate`].
#[allow(async_fn_in_trait)]
pub trait DomSession {
    /// Handle to a node of the current document
    type Node: Clone + fmt::Debug;

    /// All nodes under `scope` matching `locator`, in document order.
    async fn query_all(
        &self,
        scope: Scope<'_, Self::Node>,
        locator: &LocatorSpec,
    ) -> Result<Vec<Self::Node>, SessionError>;

    /// Read the first match under `scope` according to `locator.mode`.
    ///
    /// `Ok(None)` when nothing matches, the match is not visible while
    /// `require_visible` is set, or the requested attribute is absent.
    /// Text is trimmed; a present but empty node yields `Some("")`.
    async fn read(
        &self,
        scope: Scope<'_, Self::Node>,
        locator: &LocatorSpec,
    ) -> Result<Option<String>, SessionError>;

    /// Click the first match; `Ok(false)` when nothing matched.
    async fn click(
        &self,
        scope: Scope<'_, Self::Node>,
        locator: &LocatorSpec,
    ) -> Result<bool, SessionError>;

    /// Focus the first page-level match, type `text`, optionally submit with Enter.
    async fn type_text(
        &self,
        locator: &LocatorSpec,
        text: &str,
        submit: bool,
    ) -> Result<bool, SessionError>;

    async fn scroll(&self, action: &ScrollAction) -> Result<(), SessionError>;

    async fn measure(&self, signal: &ProgressSignal) -> Result<u64, SessionError>;

    /// Load `url`; invalidates every node handle handed out before.
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// URL of the current document, if known
    async fn current_url(&self) -> Option<String>;

    /// Presence test for `locator` under `scope`.
    async fn exists(
        &self,
        scope: Scope<'_, Self::Node>,
        locator: &LocatorSpec,
    ) -> Result<bool, SessionError> {
        Ok(!self.query_all(scope, locator).await?.is_empty())
    }
}
