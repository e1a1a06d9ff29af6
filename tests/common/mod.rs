//! Shared fixtures and session doubles for the tubescrape test suite

use std::cell::{Cell, RefCell};

use kodegen_tools_tubescrape::locator::{LocatorCatalog, LocatorSpec};
use kodegen_tools_tubescrape::session::{
    DomSession, HtmlSnapshotSession, ProgressSignal, Scope, ScrollAction, SessionError,
};
use url::Url;

pub const CHANNEL_URL: &str = "https://www.youtube.com/@fixture";
pub const VIDEOS_URL: &str = "https://www.youtube.com/@fixture/videos";

/// Wraps a body in a minimal HTML document
#[allow(dead_code)]
pub fn page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>fixture</title></head><body>{body}</body></html>")
}

/// One listing item in the layout used by [`fixture_catalog`]
#[allow(dead_code)]
pub fn video_item(title: &str, href: &str, views: &str, release_date: Option<&str>) -> String {
    let date = release_date
        .map(|d| format!(r#"<span class="date">{d}</span>"#))
        .unwrap_or_default();
    format!(
        r#"<div class="item">
             <a class="title" href="{href}">{title}</a>
             <span class="views">{views}</span>{date}
             <img class="thumb" src="/thumb/{title}.jpg">
           </div>"#
    )
}

/// Listing of `count` dated videos
#[allow(dead_code)]
pub fn video_listing(count: usize) -> String {
    let items: String = (1..=count)
        .map(|i| {
            video_item(
                &format!("Video {i}"),
                &format!("/watch?v={i}"),
                &format!("{i} views"),
                Some(&format!("{i} days ago")),
            )
        })
        .collect();
    page(&format!(r#"<nav><button class="tab-videos">Videos</button></nav>{items}"#))
}

#[allow(dead_code)]
pub fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

/// Snapshot session whose first page is `html` at [`VIDEOS_URL`]
#[allow(dead_code)]
pub fn snapshot(html: &str) -> HtmlSnapshotSession {
    HtmlSnapshotSession::from_html(html).at_url(url(VIDEOS_URL))
}

/// Catalog matching the fixture markup, with short waits
#[allow(dead_code)]
pub fn fixture_catalog() -> LocatorCatalog {
    LocatorCatalog::from_json_str(FIXTURE_CATALOG).unwrap()
}

#[allow(dead_code)]
pub const FIXTURE_CATALOG: &str = r##"{
    "channel_all_videos": ["div.item"],
    "channel_video_title": {"candidates": ["a.title-primary", "a.title"], "timeout_ms": 200},
    "channel_video_url": {"candidates": ["a.title"], "attribute": "href", "timeout_ms": 200},
    "channel_video_views": {"candidates": ["span.views"], "timeout_ms": 200},
    "channel_video_release_date": {"candidates": ["span.date"], "timeout_ms": 200},
    "channel_video_preview": {"candidates": ["img.thumb"], "attribute": "src", "timeout_ms": 200},
    "channel_video_removed": "span.badge-removed",
    "channel_video_restricted": "span.badge-members",
    "channel_video_button": {"candidates": ["button.tab-videos"], "timeout_ms": 200},
    "popular_filter": {"candidates": ["button.chip-popular"], "timeout_ms": 200},

    "channel_all_shorts": ["div.short"],
    "channel_shorts_title": {"candidates": ["h3"], "timeout_ms": 200},
    "channel_shorts_url": {"candidates": ["a"], "attribute": "href", "timeout_ms": 200},
    "channel_shorts_views": {"candidates": ["span.views"], "timeout_ms": 200},
    "channel_shorts_preview": {"candidates": ["img"], "attribute": "src", "timeout_ms": 200},
    "channel_shorts_button": {"candidates": ["button.tab-shorts"], "timeout_ms": 200},

    "search_input": {"candidates": ["input[name='search_query']"], "timeout_ms": 200},
    "search_bar_button": {"candidates": ["button#search-icon"], "timeout_ms": 200},
    "search_filters_button": {"candidates": ["button#filters"], "timeout_ms": 200},
    "search_filter_video": {"candidates": ["a.filter-video"], "timeout_ms": 200},
    "search_all_videos": ["div.result"],
    "search_video_title": {"candidates": ["a.title"], "timeout_ms": 200},
    "search_video_url": {"candidates": ["a.title"], "attribute": "href", "timeout_ms": 200},
    "search_video_views": {"candidates": ["span.views"], "timeout_ms": 200},
    "search_video_release_date": {"candidates": ["span.date"], "timeout_ms": 200},
    "search_video_channel_name": {"candidates": ["a.channel"], "timeout_ms": 200},
    "search_video_channel_url": {"candidates": ["a.channel"], "attribute": "href", "timeout_ms": 200},
    "search_video_preview": {"candidates": ["img"], "attribute": "src", "timeout_ms": 200},

    "channel_subscribers": {"candidates": ["#subs"], "timeout_ms": 200},
    "channel_number_videos": {"candidates": ["#count"], "timeout_ms": 200},
    "channel_full_name": {"candidates": ["h1"], "timeout_ms": 200},
    "channel_name": {"candidates": ["#handle"], "timeout_ms": 200},
    "channel_description_button": {"candidates": ["button.more"], "timeout_ms": 200},
    "channel_description_close_button": {"candidates": ["button.close"], "timeout_ms": 200},
    "channel_main_description": {"candidates": ["#description"], "timeout_ms": 200, "sentinel": "No description."},
    "channel_links": {"candidates": ["#links"], "timeout_ms": 200},
    "channel_country": {"candidates": ["xpath://td[@id='country']", "#country"], "timeout_ms": 200},
    "channel_registration_date": {"candidates": ["#joined"], "timeout_ms": 200},
    "channel_total_views": {"candidates": ["#views"], "timeout_ms": 200},
    "channel_banner": {"candidates": ["img.banner"], "attribute": "src", "timeout_ms": 200},
    "channel_profile_picture": {"candidates": ["img.avatar"], "attribute": "src", "timeout_ms": 200},

    "likes": {"candidates": ["button.like"], "attribute": "aria-label", "timeout_ms": 200},
    "comments": {"candidates": ["#comment-count"], "timeout_ms": 200},
    "shorts_likes": {"candidates": ["span.short-likes"], "timeout_ms": 200},
    "shorts_comments": {"candidates": ["span.short-comments"], "timeout_ms": 200}
}"##;

/// Session wrapper that logs every command and can simulate a lost browser
///
/// Log entries look like `read:a.title` or `scroll`. [`RecordingSession::fail_on`]
/// makes one command fail; [`RecordingSession::render_input_after`] hides
/// the text input for the first few attempts.
#[allow(dead_code)]
pub struct RecordingSession<S> {
    inner: S,
    calls: RefCell<Vec<String>>,
    close_after: Cell<Option<usize>>,
    faults: Vec<(String, SessionError)>,
    input_misses: Cell<usize>,
}

#[allow(dead_code)]
impl<S: DomSession> RecordingSession<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
            close_after: Cell::new(None),
            faults: Vec::new(),
            input_misses: Cell::new(0),
        }
    }

    /// Answer every command logged as `entry` with `error`.
    pub fn fail_on(mut self, entry: &str, error: SessionError) -> Self {
        self.faults.push((entry.to_string(), error));
        self
    }

    /// Report the text input as absent for the first `attempts` typing commands.
    pub fn render_input_after(self, attempts: usize) -> Self {
        self.input_misses.set(attempts);
        self
    }

    /// Fail every command after the first `calls` with [`SessionError::Closed`].
    pub fn close_after(self, calls: usize) -> Self {
        self.close_after.set(Some(calls));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn log(&self, entry: String) -> Result<(), SessionError> {
        let mut calls = self.calls.borrow_mut();
        if let Some(limit) = self.close_after.get()
            && calls.len() >= limit
        {
            return Err(SessionError::Closed("target closed".into()));
        }
        let fault = self
            .faults
            .iter()
            .find(|(on, _)| *on == entry)
            .map(|(_, error)| error.clone());
        calls.push(entry);
        fault.map_or(Ok(()), Err)
    }
}

impl<S: DomSession> DomSession for RecordingSession<S> {
    type Node = S::Node;

    async fn query_all(
        &self,
        scope: Scope<'_, S::Node>,
        locator: &LocatorSpec,
    ) -> Result<Vec<S::Node>, SessionError> {
        self.log(format!("query:{}", locator.expression))?;
        self.inner.query_all(scope, locator).await
    }

    async fn read(
        &self,
        scope: Scope<'_, S::Node>,
        locator: &LocatorSpec,
    ) -> Result<Option<String>, SessionError> {
        self.log(format!("read:{}", locator.expression))?;
        self.inner.read(scope, locator).await
    }

    async fn click(
        &self,
        scope: Scope<'_, S::Node>,
        locator: &LocatorSpec,
    ) -> Result<bool, SessionError> {
        self.log(format!("click:{}", locator.expression))?;
        self.inner.click(scope, locator).await
    }

    async fn type_text(
        &self,
        locator: &LocatorSpec,
        text: &str,
        submit: bool,
    ) -> Result<bool, SessionError> {
        self.log(format!("type:{}", locator.expression))?;
        let misses = self.input_misses.get();
        if misses > 0 {
            self.input_misses.set(misses - 1);
            return Ok(false);
        }
        self.inner.type_text(locator, text, submit).await
    }

    async fn scroll(&self, action: &ScrollAction) -> Result<(), SessionError> {
        self.log("scroll".into())?;
        self.inner.scroll(action).await
    }

    async fn measure(&self, signal: &ProgressSignal) -> Result<u64, SessionError> {
        self.log("measure".into())?;
        self.inner.measure(signal).await
    }

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.log(format!("navigate:{url}"))?;
        self.inner.navigate(url).await
    }

    async fn current_url(&self) -> Option<String> {
        self.inner.current_url().await
    }
}

/// Page that keeps growing: every scroll adds 100 to the measured signal
///
/// `fail_at` makes the n-th measurement (1-based) fail with the given error.
#[allow(dead_code)]
#[derive(Default)]
pub struct EndlessFeed {
    scrolls: Cell<u64>,
    measures: Cell<u32>,
    fail_at: Option<(u32, SessionError)>,
}

#[allow(dead_code)]
impl EndlessFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(measure: u32, error: SessionError) -> Self {
        Self {
            fail_at: Some((measure, error)),
            ..Self::default()
        }
    }

    pub fn scrolls(&self) -> u64 {
        self.scrolls.get()
    }
}

impl DomSession for EndlessFeed {
    type Node = usize;

    async fn query_all(
        &self,
        _scope: Scope<'_, usize>,
        _locator: &LocatorSpec,
    ) -> Result<Vec<usize>, SessionError> {
        Ok(Vec::new())
    }

    async fn read(
        &self,
        _scope: Scope<'_, usize>,
        _locator: &LocatorSpec,
    ) -> Result<Option<String>, SessionError> {
        Ok(None)
    }

    async fn click(
        &self,
        _scope: Scope<'_, usize>,
        _locator: &LocatorSpec,
    ) -> Result<bool, SessionError> {
        Ok(false)
    }

    async fn type_text(
        &self,
        _locator: &LocatorSpec,
        _text: &str,
        _submit: bool,
    ) -> Result<bool, SessionError> {
        Ok(false)
    }

    async fn scroll(&self, _action: &ScrollAction) -> Result<(), SessionError> {
        self.scrolls.set(self.scrolls.get() + 1);
        Ok(())
    }

    async fn measure(&self, _signal: &ProgressSignal) -> Result<u64, SessionError> {
        let n = self.measures.get() + 1;
        self.measures.set(n);
        match &self.fail_at {
            Some((at, error)) if *at == n => Err(error.clone()),
            _ => Ok(self.scrolls.get() * 100),
        }
    }

    async fn navigate(&self, _url: &str) -> Result<(), SessionError> {
        Ok(())
    }

    async fn current_url(&self) -> Option<String> {
        None
    }
}
