//! Getter methods for `ScrapeConfig`

use std::path::Path;
use std::time::Duration;

use super::types::ScrapeConfig;
use crate::engine::PaginationSettings;

impl ScrapeConfig {
    #[must_use]
    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    #[must_use]
    pub fn default_wait_timeout_ms(&self) -> u64 {
        self.default_wait_timeout_ms
    }

    #[must_use]
    pub fn locator_poll_interval_ms(&self) -> u64 {
        self.locator_poll_interval_ms
    }

    #[must_use]
    pub fn availability_probe_timeout_ms(&self) -> u64 {
        self.availability_probe_timeout_ms
    }

    #[must_use]
    pub fn pagination(&self) -> &PaginationSettings {
        &self.pagination
    }

    #[must_use]
    pub fn short_form_pattern(&self) -> &str {
        &self.short_form_pattern
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    #[must_use]
    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    #[must_use]
    pub fn pacing_jitter_ms(&self) -> u64 {
        self.pacing_jitter_ms
    }

    #[must_use]
    pub fn user_data_dir(&self) -> Option<&Path> {
        self.user_data_dir.as_deref()
    }
}
