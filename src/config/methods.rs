//! Builder methods available for all states, and config validation

use anyhow::{Result, bail};
use regex::Regex;
use std::path::PathBuf;

use super::builder::ScrapeConfigBuilder;
use super::types::ScrapeConfig;
use crate::session::{ProgressSignal, ScrollAction};

impl ScrapeConfig {
    /// Check ranges and compile the short-form pattern.
    ///
    /// Called by the builder and by callers that deserialize a config.
    pub fn validate(&self) -> Result<()> {
        if self.locator_poll_interval_ms == 0 {
            bail!("locator_poll_interval_ms must be greater than zero");
        }
        if self.pagination.poll_interval_ms == 0 {
            bail!("pagination poll_interval_ms must be greater than zero");
        }
        if self.pagination.max_iterations == 0 {
            bail!("pagination max_iterations must be at least 1");
        }
        if self.pagination.confirmations == 0 {
            bail!("pagination confirmations must be at least 1");
        }
        if self.page_load_timeout_secs == 0 {
            bail!("page_load_timeout_secs must be greater than zero");
        }
        if let Err(e) = Regex::new(&self.short_form_pattern) {
            bail!("Invalid short_form_pattern '{}': {e}", self.short_form_pattern);
        }
        Ok(())
    }
}

impl<State> ScrapeConfigBuilder<State> {
    #[must_use]
    pub fn default_wait_timeout_ms(mut self, ms: u64) -> Self {
        self.config.default_wait_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn locator_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.locator_poll_interval_ms = ms;
        self
    }

    /// Cap on each availability marker probe
    ///
    /// Keep this sub-second: probes run for every listing item before any
    /// field is read.
    #[must_use]
    pub fn availability_probe_timeout_ms(mut self, ms: u64) -> Self {
        self.config.availability_probe_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn scroll_action(mut self, action: ScrollAction) -> Self {
        self.config.pagination.action = action;
        self
    }

    #[must_use]
    pub fn progress_signal(mut self, signal: ProgressSignal) -> Self {
        self.config.pagination.signal = signal;
        self
    }

    #[must_use]
    pub fn pagination_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.pagination.poll_interval_ms = ms;
        self
    }

    #[must_use]
    pub fn max_scroll_iterations(mut self, iterations: u32) -> Self {
        self.config.pagination.max_iterations = iterations;
        self
    }

    /// Number of consecutive unchanged measurements before a page counts as stable
    #[must_use]
    pub fn stable_confirmations(mut self, confirmations: u32) -> Self {
        self.config.pagination.confirmations = confirmations;
        self
    }

    #[must_use]
    pub fn short_form_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.short_form_pattern = pattern.into();
        self
    }

    /// Set browser headless mode
    ///
    /// Headed mode only takes effect in debug builds; release builds force
    /// headless.
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn page_load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_load_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn navigation_settle_ms(mut self, ms: u64) -> Self {
        self.config.navigation_settle_ms = ms;
        self
    }

    #[must_use]
    pub fn pacing_jitter_ms(mut self, ms: u64) -> Self {
        self.config.pacing_jitter_ms = ms;
        self
    }

    #[must_use]
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.user_data_dir = Some(dir.into());
        self
    }
}
