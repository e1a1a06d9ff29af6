//! Offline session over captured HTML
//!
//! A snapshot page is a list of frames captured while scrolling a live
//! page. Each scroll advances to the next frame, which replays the lazy
//! rendering of an infinite-scroll listing without a browser. Nodes keep
//! pointing at the frame they were collected from until the next
//! navigation.
//!
//! There is no layout engine behind a snapshot, so a few things are
//! approximated:
//! - visibility means "no `hidden` attribute and no inline
//!   `display:none` / `visibility:hidden` on the node or an ancestor"
//! - the vertical offset is the frame index times [`VIEWPORT_HEIGHT`]
//! - the document height is the number of elements in the frame
//!
//! XPath is not evaluated; such locators fail with
//! [`SessionError::Unsupported`] and the extractor moves on.

use std::cell::{Cell, RefCell};

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;
use url::Url;

use super::{DomSession, ProgressSignal, Scope, ScrollAction, SessionError};
use crate::locator::{LocatorKind, LocatorSpec, ReadMode};
use crate::utils::{collapse_whitespace, resolve_url};

/// Pixels per simulated scroll step
pub const VIEWPORT_HEIGHT: u64 = 800;

/// Handle to an element of one snapshot frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNode {
    page: usize,
    frame: usize,
    generation: u64,
    id: NodeId,
}

struct SnapshotPage {
    url: Option<Url>,
    frames: Vec<Html>,
}

/// [`DomSession`] over parsed HTML frames
pub struct HtmlSnapshotSession {
    pages: Vec<SnapshotPage>,
    page: Cell<usize>,
    frame: Cell<usize>,
    generation: Cell<u64>,
    clicks: RefCell<Vec<String>>,
    typed: RefCell<Vec<String>>,
}

impl HtmlSnapshotSession {
    /// Session over a single static document.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        Self::from_frames([html])
    }

    /// Session whose first page scrolls through `frames` in order.
    ///
    /// An empty iterator yields one empty document.
    #[must_use]
    pub fn from_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            pages: vec![SnapshotPage {
                url: None,
                frames: parse_frames(frames),
            }],
            page: Cell::new(0),
            frame: Cell::new(0),
            generation: Cell::new(0),
            clicks: RefCell::new(Vec::new()),
            typed: RefCell::new(Vec::new()),
        }
    }

    /// Set the URL of the first page; relative `href`/`src` values resolve against it.
    #[must_use]
    pub fn at_url(mut self, url: Url) -> Self {
        if let Some(first) = self.pages.first_mut() {
            first.url = Some(url);
        }
        self
    }

    /// Register another page reachable through [`DomSession::navigate`].
    #[must_use]
    pub fn with_page<I, S>(mut self, url: Url, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pages.push(SnapshotPage {
            url: Some(url),
            frames: parse_frames(frames),
        });
        self
    }

    /// Locator expressions clicked so far, in order.
    #[must_use]
    pub fn clicked(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    /// Text typed so far, in order.
    #[must_use]
    pub fn typed(&self) -> Vec<String> {
        self.typed.borrow().clone()
    }

    /// Index of the frame currently shown.
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.frame.get()
    }

    fn active_page(&self) -> &SnapshotPage {
        &self.pages[self.page.get()]
    }

    fn frame_html(&self, page: usize, frame: usize) -> &Html {
        &self.pages[page].frames[frame]
    }

    fn selector(locator: &LocatorSpec) -> Result<Selector, SessionError> {
        match locator.kind {
            LocatorKind::Css => {
                Selector::parse(&locator.expression).map_err(|e| SessionError::InvalidLocator {
                    expression: locator.expression.clone(),
                    message: e.to_string(),
                })
            }
            LocatorKind::Xpath => Err(SessionError::Unsupported(format!(
                "xpath locator '{}' in HTML snapshot",
                locator.expression
            ))),
        }
    }

    /// Matches under `scope` as (page, frame, element) triples.
    fn matches<'s>(
        &'s self,
        scope: Scope<'_, SnapshotNode>,
        locator: &LocatorSpec,
    ) -> Result<(usize, usize, Vec<ElementRef<'s>>), SessionError> {
        let selector = Self::selector(locator)?;

        let (page, frame, found): (usize, usize, Vec<ElementRef<'s>>) = match scope {
            Scope::Page => {
                let (page, frame) = (self.page.get(), self.frame.get());
                let html = self.frame_html(page, frame);
                (page, frame, html.select(&selector).collect())
            }
            Scope::Node(node) => {
                if node.generation != self.generation.get() {
                    return Err(SessionError::Stale {
                        node: format!("{:?}", node.id),
                    });
                }
                let html = self.frame_html(node.page, node.frame);
                let root = html
                    .tree
                    .get(node.id)
                    .and_then(ElementRef::wrap)
                    .ok_or_else(|| SessionError::Stale {
                        node: format!("{:?}", node.id),
                    })?;
                let found = root
                    .select(&selector)
                    .filter(|el| el.id() != root.id())
                    .collect();
                (node.page, node.frame, found)
            }
        };

        let found = if locator.require_visible {
            found.into_iter().filter(|el| is_rendered(*el)).collect()
        } else {
            found
        };
        Ok((page, frame, found))
    }
}

fn parse_frames<I, S>(frames: I) -> Vec<Html>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed: Vec<Html> = frames
        .into_iter()
        .map(|raw| Html::parse_document(raw.as_ref()))
        .collect();
    if parsed.is_empty() {
        parsed.push(Html::parse_document(""));
    }
    parsed
}

fn is_rendered(el: ElementRef<'_>) -> bool {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .all(|node| {
            let value = node.value();
            if value.attr("hidden").is_some() {
                return false;
            }
            let style: String = value
                .attr("style")
                .unwrap_or_default()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            !(style.contains("display:none") || style.contains("visibility:hidden"))
        })
}

impl DomSession for HtmlSnapshotSession {
    type Node = SnapshotNode;

    async fn query_all(
        &self,
        scope: Scope<'_, SnapshotNode>,
        locator: &LocatorSpec,
    ) -> Result<Vec<SnapshotNode>, SessionError> {
        let (page, frame, found) = self.matches(scope, locator)?;
        let generation = self.generation.get();
        Ok(found
            .into_iter()
            .map(|el| SnapshotNode {
                page,
                frame,
                generation,
                id: el.id(),
            })
            .collect())
    }

    async fn read(
        &self,
        scope: Scope<'_, SnapshotNode>,
        locator: &LocatorSpec,
    ) -> Result<Option<String>, SessionError> {
        let (page, _, found) = self.matches(scope, locator)?;
        let Some(el) = found.first() else {
            return Ok(None);
        };

        Ok(match &locator.mode {
            ReadMode::Text => Some(collapse_whitespace(&el.text().collect::<String>())),
            ReadMode::Attribute(name) => el.value().attr(name).map(|raw| match name.as_str() {
                "href" | "src" => resolve_url(self.pages[page].url.as_ref(), raw),
                _ => raw.to_string(),
            }),
        })
    }

    async fn click(
        &self,
        scope: Scope<'_, SnapshotNode>,
        locator: &LocatorSpec,
    ) -> Result<bool, SessionError> {
        let (_, _, found) = self.matches(scope, locator)?;
        if found.is_empty() {
            return Ok(false);
        }
        self.clicks.borrow_mut().push(locator.expression.clone());
        Ok(true)
    }

    async fn type_text(
        &self,
        locator: &LocatorSpec,
        text: &str,
        _submit: bool,
    ) -> Result<bool, SessionError> {
        let (_, _, found) = self.matches(Scope::Page, locator)?;
        if found.is_empty() {
            return Ok(false);
        }
        self.typed.borrow_mut().push(text.to_string());
        Ok(true)
    }

    async fn scroll(&self, _action: &ScrollAction) -> Result<(), SessionError> {
        let last = self.active_page().frames.len() - 1;
        let next = (self.frame.get() + 1).min(last);
        trace!(frame = next, "Snapshot scroll");
        self.frame.set(next);
        Ok(())
    }

    async fn measure(&self, signal: &ProgressSignal) -> Result<u64, SessionError> {
        let frame = self.frame.get();
        match signal {
            ProgressSignal::VerticalOffset => Ok(frame as u64 * VIEWPORT_HEIGHT),
            ProgressSignal::DocumentHeight => {
                let html = self.frame_html(self.page.get(), frame);
                Ok(html.tree.nodes().filter(|n| n.value().is_element()).count() as u64)
            }
            ProgressSignal::ItemCount { locator } => {
                let (_, _, found) = self.matches(Scope::Page, locator)?;
                Ok(found.len() as u64)
            }
        }
    }

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let target = Url::parse(url)
            .map_err(|e| SessionError::Protocol(format!("Invalid navigation URL {url}: {e}")))?;
        let index = self
            .pages
            .iter()
            .position(|page| page.url.as_ref() == Some(&target))
            .ok_or_else(|| SessionError::Protocol(format!("No snapshot captured for {url}")))?;

        self.generation.set(self.generation.get() + 1);
        self.page.set(index);
        self.frame.set(0);
        Ok(())
    }

    async fn current_url(&self) -> Option<String> {
        self.active_page().url.as_ref().map(Url::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="item"><a class="title" href="/watch?v=a">  First
              video </a></div>
          <div class="item" style="display: none"><a class="title">Hidden</a></div>
        </body></html>
    "#;

    #[tokio::test]
    async fn scoped_read_resolves_relative_href() {
        let base = Url::parse("https://www.youtube.com/@chan/videos").expect("valid url");
        let session = HtmlSnapshotSession::from_html(LISTING).at_url(base);

        let items = session
            .query_all(Scope::Page, &LocatorSpec::css("div.item"))
            .await
            .expect("query");
        assert_eq!(items.len(), 2);

        let title = session
            .read(Scope::Node(&items[0]), &LocatorSpec::css("a.title"))
            .await
            .expect("read");
        assert_eq!(title.as_deref(), Some("First video"));

        let href = session
            .read(
                Scope::Node(&items[0]),
                &LocatorSpec::css("a.title").read(ReadMode::attribute("href")),
            )
            .await
            .expect("read");
        assert_eq!(href.as_deref(), Some("https://www.youtube.com/watch?v=a"));
    }

    #[tokio::test]
    async fn missing_attribute_reads_as_none() {
        let session = HtmlSnapshotSession::from_html(LISTING);
        let value = session
            .read(
                Scope::Page,
                &LocatorSpec::css("div.item:nth-child(2) a").read(ReadMode::attribute("href")),
            )
            .await
            .expect("read");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn visibility_filter_skips_hidden_items() {
        let session = HtmlSnapshotSession::from_html(LISTING);
        let visible = session
            .query_all(Scope::Page, &LocatorSpec::css("div.item").visible(true))
            .await
            .expect("query");
        assert_eq!(visible.len(), 1);
    }

    #[tokio::test]
    async fn xpath_is_unsupported() {
        let session = HtmlSnapshotSession::from_html(LISTING);
        let err = session
            .read(Scope::Page, &LocatorSpec::xpath("//div"))
            .await
            .expect_err("xpath must fail");
        assert!(err.skips_candidate());
    }

    #[tokio::test]
    async fn navigation_makes_nodes_stale() {
        let home = Url::parse("https://www.youtube.com/").expect("valid url");
        let other = Url::parse("https://www.youtube.com/watch?v=a").expect("valid url");
        let session = HtmlSnapshotSession::from_html(LISTING)
            .at_url(home)
            .with_page(other.clone(), ["<html><body><p>watch</p></body></html>"]);

        let items = session
            .query_all(Scope::Page, &LocatorSpec::css("div.item"))
            .await
            .expect("query");
        session.navigate(other.as_str()).await.expect("navigate");

        let err = session
            .read(Scope::Node(&items[0]), &LocatorSpec::css("a"))
            .await
            .expect_err("stale");
        assert!(matches!(err, SessionError::Stale { .. }));
        assert_eq!(session.current_url().await.as_deref(), Some(other.as_str()));
    }

    #[tokio::test]
    async fn scrolling_walks_frames_then_stops() {
        let session = HtmlSnapshotSession::from_frames(["<p>1</p>", "<p>1</p><p>2</p>"]);
        let count = ProgressSignal::ItemCount {
            locator: LocatorSpec::css("p"),
        };
        assert_eq!(session.measure(&count).await.expect("measure"), 1);
        session.scroll(&ScrollAction::PageDown).await.expect("scroll");
        assert_eq!(session.measure(&count).await.expect("measure"), 2);
        session.scroll(&ScrollAction::PageDown).await.expect("scroll");
        assert_eq!(session.frame_index(), 1);
    }
}
