//! Core configuration type for scraping runs
//!
//! `ScrapeConfig` carries every tunable of the engine, the browser launch
//! and the workflows. It deserializes with defaults for missing fields, so
//! a jobs file only needs to name what it overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::PaginationSettings;
use crate::utils::constants::{
    AVAILABILITY_PROBE_TIMEOUT_MS, DEFAULT_WAIT_TIMEOUT_MS, LOCATOR_POLL_INTERVAL_MS,
    NAVIGATION_SETTLE_MS, PACING_JITTER_MS, PAGE_LOAD_TIMEOUT_SECS, SHORT_FORM_URL_PATTERN,
};

/// Default location of the bundled locator catalog
pub const DEFAULT_CATALOG_PATH: &str = "catalog/youtube.json";

/// Main configuration struct for scraping runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Locator catalog JSON file
    pub(crate) catalog_path: PathBuf,

    /// Wait budget for catalog candidates that do not declare their own
    pub(crate) default_wait_timeout_ms: u64,

    /// Poll interval of locator waits
    pub(crate) locator_poll_interval_ms: u64,

    /// Cap on each availability marker probe
    ///
    /// Probes run once per listing item, so this stays far below the
    /// field wait budget.
    pub(crate) availability_probe_timeout_ms: u64,

    /// Scroll action, progress signal, pacing and cap of pagination
    pub(crate) pagination: PaginationSettings,

    /// Regex that marks a URL as a short-form video
    pub(crate) short_form_pattern: String,

    pub(crate) headless: bool,

    /// Timeout in seconds for `page.goto()` plus load
    pub(crate) page_load_timeout_secs: u64,

    /// Fixed pause after navigation and clicks
    pub(crate) navigation_settle_ms: u64,

    /// Upper bound of the random jitter added to each pause
    pub(crate) pacing_jitter_ms: u64,

    /// Chrome user data directory; a fresh temporary profile when unset
    pub(crate) user_data_dir: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            default_wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            locator_poll_interval_ms: LOCATOR_POLL_INTERVAL_MS,
            availability_probe_timeout_ms: AVAILABILITY_PROBE_TIMEOUT_MS,
            pagination: PaginationSettings::default(),
            short_form_pattern: SHORT_FORM_URL_PATTERN.to_string(),
            headless: true,
            page_load_timeout_secs: PAGE_LOAD_TIMEOUT_SECS,
            navigation_settle_ms: NAVIGATION_SETTLE_MS,
            pacing_jitter_ms: PACING_JITTER_MS,
            user_data_dir: None,
        }
    }
}
