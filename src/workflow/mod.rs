//! Workflows: navigation plus engine
//!
//! A [`Scraper`] owns the catalog, the config and the engine parts built
//! from it. Its workflows validate the requested keys first, then drive
//! the session: open the page, click through tabs and filters, stabilize
//! pagination, collect nodes and run the pipeline.

pub mod channel;
pub mod navigation;
pub mod search;
pub mod watch_page;

pub use channel::{ListingTab, SortOrder};
pub use navigation::{NavigationError, Navigator, Pacing};

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use crate::config::ScrapeConfig;
use crate::engine::{
    EngineError, ExtractedRecord, ExtractionPipeline, PaginationController, PaginationReport,
};
use crate::locator::LocatorCatalog;
use crate::registry::{EntityDomain, FieldRegistry, FieldSelection, RegistryError};
use crate::session::DomSession;

/// Catalog, config and engine for running workflows
pub struct Scraper {
    config: ScrapeConfig,
    catalog: LocatorCatalog,
    pipeline: ExtractionPipeline,
    pagination: PaginationController,
    pacing: Pacing,
}

impl Scraper {
    pub fn new(config: ScrapeConfig, catalog: LocatorCatalog) -> Result<Self, EngineError> {
        let pipeline = ExtractionPipeline::from_config(&config)?;
        let pagination = PaginationController::new(config.pagination().clone());
        let pacing = Pacing::new(config.navigation_settle(), config.pacing_jitter_ms());
        Ok(Self {
            config,
            catalog,
            pipeline,
            pagination,
            pacing,
        })
    }

    /// Replace the pause taken after navigation and clicks.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &LocatorCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn pipeline(&self) -> &ExtractionPipeline {
        &self.pipeline
    }

    /// Registry of `domain` built from this scraper's catalog.
    pub fn registry(&self, domain: EntityDomain) -> Result<FieldRegistry, RegistryError> {
        FieldRegistry::for_domain(domain, &self.catalog, self.config.default_wait_timeout_ms())
    }

    /// Validated selection; `None` selects every field of the registry.
    pub fn selection(
        &self,
        registry: &FieldRegistry,
        keys: Option<&[String]>,
    ) -> Result<FieldSelection, RegistryError> {
        match keys {
            Some(keys) => FieldSelection::parse(registry, keys),
            None => Ok(FieldSelection::all(registry)),
        }
    }

    fn navigator<'a, S: DomSession>(&'a self, session: &'a S) -> Navigator<'a, S> {
        Navigator::new(
            session,
            &self.catalog,
            *self.pipeline.extractor(),
            self.pacing,
            self.config.default_wait_timeout_ms(),
        )
    }

    /// Scroll the current page until stable.
    pub async fn stabilize<S: DomSession>(&self, session: &S) -> Result<PaginationReport> {
        let report = self
            .pagination
            .stabilize(session)
            .await
            .map_err(EngineError::SessionClosed)?;
        info!(
            iterations = report.iterations,
            outcome = ?report.outcome,
            "Pagination finished"
        );
        Ok(report)
    }

    /// Stabilize, collect listing nodes, extract one record per node.
    async fn extract_listing<S: DomSession>(
        &self,
        session: &S,
        registry: &FieldRegistry,
        selection: &FieldSelection,
    ) -> Result<Vec<ExtractedRecord>> {
        self.stabilize(session).await?;
        // Let the last batch finish rendering before collecting.
        tokio::time::sleep(Duration::from_millis(self.config.pagination().poll_interval_ms)).await;

        let nodes = self
            .pipeline
            .collect_nodes(session, registry)
            .await
            .with_context(|| format!("Failed to collect {} items", registry.domain()))?;
        let records = self
            .pipeline
            .run(session, &nodes, selection, registry)
            .await
            .with_context(|| format!("Extraction of {} items failed", registry.domain()))?;
        Ok(records)
    }
}
