//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! The catalog path is the only required field; `build()` is available
//! once it has been set and validates every numeric range.

use anyhow::Result;
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::ScrapeConfig;

// Type states for the builder
pub struct WithCatalog;

pub struct ScrapeConfigBuilder<State = ()> {
    pub(crate) config: ScrapeConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        Self {
            config: ScrapeConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }

    /// Builder seeded with this config, e.g. one read from a jobs file
    #[must_use]
    pub fn into_builder(self) -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder {
            config: self,
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfigBuilder<()> {
    pub fn catalog_path(mut self, path: impl Into<PathBuf>) -> ScrapeConfigBuilder<WithCatalog> {
        self.config.catalog_path = path.into();
        ScrapeConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when the catalog is set
impl ScrapeConfigBuilder<WithCatalog> {
    pub fn build(self) -> Result<ScrapeConfig> {
        let config = self.config;
        config.validate()?;

        // Enforce headless mode in release builds for production safety
        #[cfg(not(debug_assertions))]
        let config = if config.headless {
            config
        } else {
            tracing::warn!(
                "Forcing headless mode in release build. \
                Headed mode is only available in debug builds for development."
            );
            ScrapeConfig {
                headless: true,
                ..config
            }
        };

        Ok(config)
    }
}
