//! Extraction pipeline
//!
//! Per entity, in input order: availability gate, then one extraction per
//! requested key in the caller's order. `type` is answered by the
//! classifier from the `url` and `release_date` signals, which are
//! extracted on demand and cached so a later request for them reuses the
//! same result. Every input entity yields exactly one record.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span, warn};

use super::availability::AvailabilityGate;
use super::classifier::{EntityClassifier, EntityType};
use super::errors::EngineError;
use super::extractor::FieldExtractor;
use super::outcome::{FieldOutcome, FieldValue};
use super::record::ExtractedRecord;
use crate::config::ScrapeConfig;
use crate::registry::{
    FieldRegistry, FieldSelection, RELEASE_DATE_KEY, RegistryError, TYPE_KEY, URL_KEY,
};
use crate::session::{DomSession, Scope};

/// Key of the status field written into records of unavailable entities
pub const STATUS_KEY: &str = "status";

/// Extracted value of one field plus whether it came from a fault
#[derive(Debug, Clone)]
struct Resolved {
    value: FieldValue,
    faulted: bool,
}

/// Availability gate + field extractor + classifier
#[derive(Debug, Clone, Default)]
pub struct ExtractionPipeline {
    extractor: FieldExtractor,
    gate: AvailabilityGate,
    classifier: EntityClassifier,
}

impl ExtractionPipeline {
    #[must_use]
    pub fn new(
        extractor: FieldExtractor,
        gate: AvailabilityGate,
        classifier: EntityClassifier,
    ) -> Self {
        Self {
            extractor,
            gate,
            classifier,
        }
    }

    /// Pipeline tuned by `config`.
    pub fn from_config(config: &ScrapeConfig) -> Result<Self, EngineError> {
        let extractor =
            FieldExtractor::new(Duration::from_millis(config.locator_poll_interval_ms()));
        Ok(Self {
            extractor,
            gate: AvailabilityGate::new(extractor, config.availability_probe_timeout_ms()),
            classifier: EntityClassifier::new(config.short_form_pattern())?,
        })
    }

    #[must_use]
    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    #[must_use]
    pub fn classifier(&self) -> &EntityClassifier {
        &self.classifier
    }

    /// Collect listing nodes through the registry's item locator.
    pub async fn collect_nodes<S: DomSession>(
        &self,
        session: &S,
        registry: &FieldRegistry,
    ) -> Result<Vec<S::Node>, EngineError> {
        let chain = registry
            .item_locator()
            .ok_or(EngineError::NoItemLocator(registry.domain()))?;
        let nodes = self
            .extractor
            .collect(session, Scope::Page, chain)
            .await
            .map_err(EngineError::from_session)?;
        info!(domain = %registry.domain(), count = nodes.len(), "Collected listing nodes");
        Ok(nodes)
    }

    /// Extract one record per node, in node order.
    ///
    /// Only a closed session ends the run early.
    pub async fn run<S: DomSession>(
        &self,
        session: &S,
        nodes: &[S::Node],
        selection: &FieldSelection,
        registry: &FieldRegistry,
    ) -> Result<Vec<ExtractedRecord>, EngineError> {
        info!(
            domain = %registry.domain(),
            entities = nodes.len(),
            fields = selection.len(),
            "Starting extraction"
        );

        let mut records = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            let span = info_span!("entity", node = index + 1, total = nodes.len());
            let record = self
                .extract_entity(session, Scope::Node(node), selection, registry)
                .instrument(span)
                .await?;
            records.push(record);
        }

        info!(domain = %registry.domain(), records = records.len(), "Extraction finished");
        Ok(records)
    }

    /// Extract a single page-scope record, then run the registry's cleanup click.
    pub async fn run_page<S: DomSession>(
        &self,
        session: &S,
        selection: &FieldSelection,
        registry: &FieldRegistry,
    ) -> Result<ExtractedRecord, EngineError> {
        let span = info_span!("page", domain = %registry.domain());
        let record = self
            .extract_entity(session, Scope::Page, selection, registry)
            .instrument(span)
            .await?;

        if let Some(cleanup) = registry.cleanup() {
            match self.extractor.click(session, Scope::Page, cleanup).await {
                Ok(true) => debug!("Cleanup click done"),
                Ok(false) => debug!("Cleanup target not present"),
                Err(e) if e.is_fatal() => return Err(EngineError::SessionClosed(e)),
                Err(e) => warn!(error = %e, "Cleanup click failed"),
            }
        }
        Ok(record)
    }

    async fn extract_entity<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        selection: &FieldSelection,
        registry: &FieldRegistry,
    ) -> Result<ExtractedRecord, EngineError> {
        let availability = self
            .gate
            .check(session, scope, registry.markers())
            .await
            .map_err(EngineError::SessionClosed)?;

        if !availability.is_available() {
            info!(status = %availability, "Skipping unavailable entity");
            let mut record = ExtractedRecord::with_capacity(selection.len() + 1);
            record.insert(STATUS_KEY, FieldValue::text(availability.as_str()));
            for key in selection.keys() {
                record.insert(key.as_str(), FieldValue::Null);
            }
            return Ok(record);
        }

        let mut cache: HashMap<String, Resolved> = HashMap::new();
        let mut record = ExtractedRecord::with_capacity(selection.len());

        for key in selection.keys() {
            let value = if key == TYPE_KEY {
                let entity_type = self.classify_entity(session, scope, registry, &mut cache).await?;
                FieldValue::text(entity_type.as_str())
            } else {
                self.resolve(session, scope, registry, key, &mut cache)
                    .await?
                    .value
            };
            record.insert(key.as_str(), value);
        }

        Ok(record)
    }

    async fn classify_entity<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        registry: &FieldRegistry,
        cache: &mut HashMap<String, Resolved>,
    ) -> Result<EntityType, EngineError> {
        let mut signals = ExtractedRecord::with_capacity(2);
        let mut faulted = false;

        for key in [URL_KEY, RELEASE_DATE_KEY] {
            if !registry.contains(key) {
                continue;
            }
            let resolved = self.resolve(session, scope, registry, key, cache).await?;
            faulted |= resolved.faulted;
            signals.insert(key, resolved.value);
        }

        if faulted {
            warn!("Classification signal faulted, type is unknown");
            return Ok(EntityType::Unknown);
        }

        let entity_type = self.classifier.classify(&signals);
        debug!(entity_type = %entity_type, "Classified entity");
        Ok(entity_type)
    }

    async fn resolve<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        registry: &FieldRegistry,
        key: &str,
        cache: &mut HashMap<String, Resolved>,
    ) -> Result<Resolved, EngineError> {
        if let Some(hit) = cache.get(key) {
            return Ok(hit.clone());
        }

        let field = registry
            .get(key)
            .ok_or_else(|| RegistryError::UnknownField {
                key: key.to_string(),
                domain: registry.domain(),
                available: registry
                    .fields()
                    .iter()
                    .map(|f| f.key())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;

        let outcome = self.extractor.extract(session, scope, field).await;
        if let Some(e) = outcome.fatal_error() {
            return Err(EngineError::SessionClosed(e.clone()));
        }

        let resolved = Resolved {
            faulted: matches!(outcome, FieldOutcome::Fault(_)),
            value: outcome.into_value(field.sentinel()),
        };
        cache.insert(key.to_string(), resolved.clone());
        Ok(resolved)
    }
}
