//! Resilient field extraction and infinite-scroll pagination for video
//! platform pages.
//!
//! The crate turns a [`locator::LocatorCatalog`] and a per-domain
//! [`registry::FieldRegistry`] into ordered [`engine::ExtractedRecord`]s,
//! driving any [`session::DomSession`]: a live chromiumoxide page or an
//! offline HTML snapshot.

pub mod browser;
pub mod config;
pub mod engine;
pub mod jobs;
pub mod locator;
pub mod registry;
pub mod session;
pub mod utils;
pub mod workflow;

pub use browser::{BrowserWrapper, find_browser_executable, launch_browser};
pub use config::ScrapeConfig;
pub use engine::{
    EngineError, EntityClassifier, EntityType, ExtractedRecord, ExtractionPipeline, FieldOutcome,
    FieldValue, PaginationController, PaginationReport, PaginationSettings,
};
pub use locator::{LocatorCatalog, LocatorChain, LocatorKind, LocatorSpec, ReadMode};
pub use registry::{EntityDomain, FieldDefinition, FieldRegistry, FieldSelection, RegistryError};
pub use session::{
    ChromeSession, DomSession, HtmlSnapshotSession, ProgressSignal, Scope, ScrollAction,
    SessionError,
};
pub use workflow::{ListingTab, Pacing, Scraper, SortOrder};

/// Extract one record per node with default engine tunables.
///
/// `field_keys` is validated against `registry` before any node is touched.
pub async fn run_extraction<S, I, K>(
    session: &S,
    nodes: &[S::Node],
    field_keys: I,
    registry: &FieldRegistry,
) -> Result<Vec<ExtractedRecord>, EngineError>
where
    S: DomSession,
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let selection = FieldSelection::parse(registry, field_keys)?;
    ExtractionPipeline::default()
        .run(session, nodes, &selection, registry)
        .await
}

/// Scroll the current page of `session` until `settings` consider it stable.
pub async fn stabilize_pagination<S: DomSession>(
    session: &S,
    settings: &PaginationSettings,
) -> Result<PaginationReport, SessionError> {
    PaginationController::new(settings.clone())
        .stabilize(session)
        .await
}

/// Classify a record with the default short-form URL pattern.
#[must_use]
pub fn classify(record: &ExtractedRecord) -> EntityType {
    EntityClassifier::default().classify(record)
}
