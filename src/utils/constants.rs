//! Shared configuration constants for tubescrape
//!
//! Default values used by the configuration builder, the extraction engine
//! and the workflows. Keeping them here avoids magic numbers scattered
//! across modules.

/// Default wait budget for one locator candidate: 1 second
///
/// Listing items render in batches; a second is enough for an already
/// scrolled list and keeps a fully missing field from stalling a page of
/// fifty items for long.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 1_000;

/// Poll interval while waiting for a locator to match: 100ms
pub const LOCATOR_POLL_INTERVAL_MS: u64 = 100;

/// Timeout for availability marker probes: 300ms
///
/// Availability probes run before every entity. They must stay well below
/// the per-field budget or a clean page of fifty items pays the full
/// timeout fifty times over.
pub const AVAILABILITY_PROBE_TIMEOUT_MS: u64 = 300;

/// Pause between a scroll action and the progress measurement: 1 second
pub const PAGINATION_POLL_INTERVAL_MS: u64 = 1_000;

/// Hard cap on scroll iterations for one page
///
/// Large channels need a few hundred page-downs to reach the end of the
/// uploads list. The cap only exists so that a page which never settles
/// cannot hang the run.
pub const MAX_SCROLL_ITERATIONS: u32 = 400;

/// Consecutive unchanged measurements required before a list counts as stable
pub const STABLE_CONFIRMATIONS: u32 = 1;

/// Default short-form video URL pattern
pub const SHORT_FORM_URL_PATTERN: &str = r"/shorts/";

/// Pause after navigation and clicks, before the next step: 1 second
pub const NAVIGATION_SETTLE_MS: u64 = 1_000;

/// Upper bound of random jitter added to each settle pause: 400ms
pub const PACING_JITTER_MS: u64 = 400;

/// Default timeout for `page.goto()` in seconds
pub const PAGE_LOAD_TIMEOUT_SECS: u64 = 30;

/// Home page used as the entry point of search workflows
pub const PLATFORM_HOME_URL: &str = "https://www.youtube.com";

/// Data attribute used to tag listing nodes inside a live page
pub const NODE_TAG_ATTRIBUTE: &str = "data-tubescrape-node";

/// Chrome user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
