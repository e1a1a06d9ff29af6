//! chromiumoxide-backed session
//!
//! All lookups run as page-side JavaScript (see [`super::js_scripts`]) so
//! that CSS and XPath both work relative to a collected node. Collected
//! nodes are tagged with a data attribute; a handle is the tag plus the
//! navigation generation it was created in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::error::CdpError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, trace};

use super::js_scripts::{
    MEASURE_BODY, QUERY_ALL_BODY, READ_BODY, SCROLL_BODY, ScriptArgs, TAG_FIRST_BODY,
    build_script,
};
use super::{DomSession, ProgressSignal, Scope, ScrollAction, SessionError};
use crate::locator::{LocatorSpec, ReadMode};
use crate::utils::constants::{NODE_TAG_ATTRIBUTE, PAGE_LOAD_TIMEOUT_SECS};

/// Handle to a tagged node of a [`ChromeSession`] page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChromeNode {
    tag: String,
    generation: u64,
}

impl ChromeNode {
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Deserialize)]
struct ScriptResponse {
    status: String,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    message: Option<String>,
}

/// [`DomSession`] over a live chromiumoxide page
pub struct ChromeSession {
    page: Page,
    generation: AtomicU64,
    navigation_timeout: Duration,
}

impl ChromeSession {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self {
            page,
            generation: AtomicU64::new(0),
            navigation_timeout: Duration::from_secs(PAGE_LOAD_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn scope_tag<'s>(&self, scope: Scope<'s, ChromeNode>) -> Result<Option<&'s str>, SessionError> {
        match scope {
            Scope::Page => Ok(None),
            Scope::Node(node) if node.generation == self.current_generation() => {
                Ok(Some(node.tag.as_str()))
            }
            Scope::Node(node) => Err(SessionError::Stale {
                node: node.tag.clone(),
            }),
        }
    }

    fn locator_json(locator: &LocatorSpec) -> serde_json::Value {
        json!({
            "kind": locator.kind.as_str(),
            "expression": locator.expression,
            "visible": locator.require_visible,
        })
    }

    /// Evaluate one command body and decode its `value`.
    async fn run<R: DeserializeOwned>(
        &self,
        body: &str,
        scope: Scope<'_, ChromeNode>,
        locator: Option<&LocatorSpec>,
        command: serde_json::Value,
    ) -> Result<R, SessionError> {
        let scope_tag = self.scope_tag(scope)?;
        let args = ScriptArgs::new(self.current_generation(), scope_tag, command);
        let script = build_script(body, &args)
            .map_err(|e| SessionError::Protocol(format!("Failed to encode script arguments: {e}")))?;

        let response: ScriptResponse = self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(browser_error)?
            .into_value()
            .map_err(|e| SessionError::Protocol(format!("Malformed script response: {e}")))?;

        let expression = locator.map(|l| l.expression.clone()).unwrap_or_default();
        match response.status.as_str() {
            "ok" => serde_json::from_value(response.value)
                .map_err(|e| SessionError::Protocol(format!("Unexpected script value: {e}"))),
            "stale" => Err(SessionError::Stale {
                node: scope_tag.unwrap_or("page").to_string(),
            }),
            "invalid" => Err(SessionError::InvalidLocator {
                expression,
                message: response.message.unwrap_or_default(),
            }),
            other => Err(SessionError::Protocol(format!(
                "Unknown script status '{other}'"
            ))),
        }
    }

    /// Tag the first match and resolve it to a native element.
    async fn first_element(
        &self,
        scope: Scope<'_, ChromeNode>,
        locator: &LocatorSpec,
    ) -> Result<Option<chromiumoxide::Element>, SessionError> {
        let tag: Option<String> = self
            .run(
                TAG_FIRST_BODY,
                scope,
                Some(locator),
                json!({ "locator": Self::locator_json(locator) }),
            )
            .await?;

        let Some(tag) = tag else {
            return Ok(None);
        };

        let element = self
            .page
            .find_element(format!("[{NODE_TAG_ATTRIBUTE}=\"{tag}\"]"))
            .await
            .map_err(browser_error)?;
        Ok(Some(element))
    }
}

impl DomSession for ChromeSession {
    type Node = ChromeNode;

    async fn query_all(
        &self,
        scope: Scope<'_, ChromeNode>,
        locator: &LocatorSpec,
    ) -> Result<Vec<ChromeNode>, SessionError> {
        let tags: Vec<String> = self
            .run(
                QUERY_ALL_BODY,
                scope,
                Some(locator),
                json!({ "locator": Self::locator_json(locator) }),
            )
            .await?;

        let generation = self.current_generation();
        trace!(locator = %locator, count = tags.len(), "query_all");
        Ok(tags
            .into_iter()
            .map(|tag| ChromeNode { tag, generation })
            .collect())
    }

    async fn read(
        &self,
        scope: Scope<'_, ChromeNode>,
        locator: &LocatorSpec,
    ) -> Result<Option<String>, SessionError> {
        let attribute = match &locator.mode {
            ReadMode::Text => None,
            ReadMode::Attribute(name) => Some(name.as_str()),
        };
        self.run(
            READ_BODY,
            scope,
            Some(locator),
            json!({ "locator": Self::locator_json(locator), "attribute": attribute }),
        )
        .await
    }

    async fn click(
        &self,
        scope: Scope<'_, ChromeNode>,
        locator: &LocatorSpec,
    ) -> Result<bool, SessionError> {
        let Some(element) = self.first_element(scope, locator).await? else {
            return Ok(false);
        };
        element.click().await.map_err(browser_error)?;
        debug!(locator = %locator, "Clicked");
        Ok(true)
    }

    async fn type_text(
        &self,
        locator: &LocatorSpec,
        text: &str,
        submit: bool,
    ) -> Result<bool, SessionError> {
        let Some(element) = self.first_element(Scope::Page, locator).await? else {
            return Ok(false);
        };
        element.click().await.map_err(browser_error)?;
        element.type_str(text).await.map_err(browser_error)?;
        if submit {
            element.press_key("Enter").await.map_err(browser_error)?;
        }
        Ok(true)
    }

    async fn scroll(&self, action: &ScrollAction) -> Result<(), SessionError> {
        let command = match action {
            ScrollAction::PageDown => json!({ "action": "page_down" }),
            ScrollAction::By { pixels } => json!({ "action": "by", "pixels": pixels }),
            ScrollAction::ToBottom => json!({ "action": "to_bottom" }),
        };
        let _: serde_json::Value = self.run(SCROLL_BODY, Scope::Page, None, command).await?;
        Ok(())
    }

    async fn measure(&self, signal: &ProgressSignal) -> Result<u64, SessionError> {
        let (command, locator) = match signal {
            ProgressSignal::VerticalOffset => (json!({ "signal": "vertical_offset" }), None),
            ProgressSignal::DocumentHeight => (json!({ "signal": "document_height" }), None),
            ProgressSignal::ItemCount { locator } => (
                json!({ "signal": "item_count", "locator": Self::locator_json(locator) }),
                Some(locator),
            ),
        };
        self.run(MEASURE_BODY, Scope::Page, locator, command).await
    }

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        // Invalidate handles up front; a failed navigation may still have unloaded the page.
        self.generation.fetch_add(1, Ordering::AcqRel);

        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, CdpError>(())
        };

        match tokio::time::timeout(self.navigation_timeout, load).await {
            Ok(result) => result.map_err(browser_error),
            Err(_) => Err(SessionError::Protocol(format!(
                "Navigation to {url} timed out after {}s",
                self.navigation_timeout.as_secs()
            ))),
        }
    }

    async fn current_url(&self) -> Option<String> {
        match self.page.url().await {
            Ok(url) => url,
            Err(e) => {
                trace!("Failed to get page URL: {e}");
                None
            }
        }
    }
}

fn browser_error(error: CdpError) -> SessionError {
    match error {
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse => {
            SessionError::Closed(error.to_string())
        }
        other => SessionError::from_browser_message(other.to_string()),
    }
}
