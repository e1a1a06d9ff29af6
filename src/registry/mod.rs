//! Field registry
//!
//! A registry is the explicit, immutable table of field definitions for
//! one entity domain. The engine is generic; everything domain-specific
//! (which fields exist, how they are located, what their sentinel is)
//! lives here.

pub mod tables;

pub use tables::{DomainTable, EntityDomain, FieldRow, RowRead, ValueTransform};

use std::collections::HashMap;
use tracing::debug;

use crate::locator::{CatalogError, LocatorCatalog, LocatorChain, ReadMode};

/// Synthetic key resolved by the entity classifier instead of a locator
pub const TYPE_KEY: &str = "type";
/// Classifier signal: entity URL
pub const URL_KEY: &str = "url";
/// Classifier signal: release date
pub const RELEASE_DATE_KEY: &str = "release_date";

/// Errors raised while building a registry or validating a field selection
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Field '{field}' of {domain} has no locator: catalog key '{locator}' is missing")]
    MissingLocator {
        domain: EntityDomain,
        field: String,
        locator: String,
    },

    #[error("Duplicate field key '{0}'")]
    DuplicateKey(String),

    #[error("Unknown field '{key}' for {domain}; available: {available}")]
    UnknownField {
        key: String,
        domain: EntityDomain,
        available: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One extractable field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    key: String,
    chain: LocatorChain,
    sentinel: String,
    pre_action: Option<LocatorChain>,
    transform: ValueTransform,
}

impl FieldDefinition {
    #[must_use]
    pub fn new(key: impl Into<String>, chain: LocatorChain, sentinel: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            chain,
            sentinel: sentinel.into(),
            pre_action: None,
            transform: ValueTransform::None,
        }
    }

    /// Click this chain once, best-effort, before locating the field.
    #[must_use]
    pub fn with_pre_action(mut self, chain: LocatorChain) -> Self {
        self.pre_action = Some(chain);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: ValueTransform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn chain(&self) -> &LocatorChain {
        &self.chain
    }

    #[must_use]
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    #[must_use]
    pub fn pre_action(&self) -> Option<&LocatorChain> {
        self.pre_action.as_ref()
    }

    #[must_use]
    pub fn transform(&self) -> ValueTransform {
        self.transform
    }
}

/// Optional markers showing that a listing item is not available
#[derive(Debug, Clone, Default)]
pub struct AvailabilityMarkers {
    pub removed: Option<LocatorChain>,
    pub restricted: Option<LocatorChain>,
}

impl AvailabilityMarkers {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_none() && self.restricted.is_none()
    }
}

/// Immutable set of field definitions for one domain
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    domain: EntityDomain,
    fields: Vec<FieldDefinition>,
    index: HashMap<String, usize>,
    item_locator: Option<LocatorChain>,
    markers: AvailabilityMarkers,
    cleanup: Option<LocatorChain>,
    classifies: bool,
}

impl FieldRegistry {
    /// Build a registry from explicit definitions.
    ///
    /// Fails on duplicate keys or on a definition named like the
    /// synthetic `type` key.
    pub fn new(domain: EntityDomain, fields: Vec<FieldDefinition>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if field.key == TYPE_KEY || index.insert(field.key.clone(), position).is_some() {
                return Err(RegistryError::DuplicateKey(field.key.clone()));
            }
        }

        Ok(Self {
            domain,
            fields,
            index,
            item_locator: None,
            markers: AvailabilityMarkers::default(),
            cleanup: None,
            classifies: false,
        })
    }

    /// Build the registry of `domain` from its static table.
    ///
    /// Every declared field, pre-action and item locator must resolve in
    /// `catalog`. Availability markers and cleanup clicks are optional.
    pub fn for_domain(
        domain: EntityDomain,
        catalog: &LocatorCatalog,
        default_timeout_ms: u64,
    ) -> Result<Self, RegistryError> {
        let table = domain.table();
        let require = |field: &str, locator: &str, mode: &ReadMode| {
            catalog
                .chain(locator, mode, default_timeout_ms)
                .map_err(|e| match e {
                    CatalogError::MissingKey(_) => RegistryError::MissingLocator {
                        domain,
                        field: field.to_string(),
                        locator: locator.to_string(),
                    },
                    other => RegistryError::Catalog(other),
                })
        };
        let optional = |locator: Option<&str>| -> Result<Option<LocatorChain>, RegistryError> {
            match locator {
                Some(key) if catalog.contains(key) => Ok(Some(catalog.chain(
                    key,
                    &ReadMode::Text,
                    default_timeout_ms,
                )?)),
                _ => Ok(None),
            }
        };

        let mut fields = Vec::with_capacity(table.fields.len());
        for row in table.fields {
            let mode = match row.read {
                RowRead::Text => ReadMode::Text,
                RowRead::Attribute(name) => ReadMode::attribute(name),
            };
            let chain = require(row.key, row.locator, &mode)?;
            let sentinel = catalog.sentinel(row.locator).unwrap_or(row.sentinel);
            let mut field = FieldDefinition::new(row.key, chain, sentinel).with_transform(row.transform);
            if let Some(pre) = row.pre_action {
                field = field.with_pre_action(require(row.key, pre, &ReadMode::Text)?);
            }
            fields.push(field);
        }

        let mut registry = Self::new(domain, fields)?;
        registry.classifies = table.classifies;
        if let Some(items) = table.item_locator {
            registry.item_locator = Some(require("<items>", items, &ReadMode::Text)?);
        }
        registry.markers = AvailabilityMarkers {
            removed: optional(table.removed_marker)?,
            restricted: optional(table.restricted_marker)?,
        };
        registry.cleanup = optional(table.cleanup)?;

        debug!(
            domain = %domain,
            fields = registry.fields.len(),
            markers = !registry.markers.is_empty(),
            "Built field registry"
        );
        Ok(registry)
    }

    #[must_use]
    pub fn with_item_locator(mut self, chain: LocatorChain) -> Self {
        self.item_locator = Some(chain);
        self
    }

    #[must_use]
    pub fn with_markers(mut self, markers: AvailabilityMarkers) -> Self {
        self.markers = markers;
        self
    }

    #[must_use]
    pub fn with_cleanup(mut self, chain: LocatorChain) -> Self {
        self.cleanup = Some(chain);
        self
    }

    /// Include `type` in [`FieldSelection::all`].
    #[must_use]
    pub fn with_classification(mut self) -> Self {
        self.classifies = true;
        self
    }

    #[must_use]
    pub fn domain(&self) -> EntityDomain {
        self.domain
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.index.get(key).map(|&i| &self.fields[i])
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Field definitions in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    #[must_use]
    pub fn item_locator(&self) -> Option<&LocatorChain> {
        self.item_locator.as_ref()
    }

    #[must_use]
    pub fn markers(&self) -> &AvailabilityMarkers {
        &self.markers
    }

    #[must_use]
    pub fn cleanup(&self) -> Option<&LocatorChain> {
        self.cleanup.as_ref()
    }

    #[must_use]
    pub fn classifies(&self) -> bool {
        self.classifies
    }

    fn available_keys(&self) -> String {
        let mut keys: Vec<&str> = self.fields.iter().map(FieldDefinition::key).collect();
        keys.push(TYPE_KEY);
        keys.join(", ")
    }
}

/// Validated, ordered list of requested keys
///
/// Duplicates collapse onto their first occurrence. `type` is accepted by
/// every registry; it resolves to `Unknown` where no signal fields exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    keys: Vec<String>,
}

impl FieldSelection {
    /// Validate `keys` against `registry` before any page work starts.
    pub fn parse<I, S>(registry: &FieldRegistry, keys: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref().trim();
            if key != TYPE_KEY && !registry.contains(key) {
                return Err(RegistryError::UnknownField {
                    key: key.to_string(),
                    domain: registry.domain(),
                    available: registry.available_keys(),
                });
            }
            if !selected.iter().any(|k| k == key) {
                selected.push(key.to_string());
            }
        }
        Ok(Self { keys: selected })
    }

    /// Every declared field, plus `type` for classifying domains.
    #[must_use]
    pub fn all(registry: &FieldRegistry) -> Self {
        let mut keys: Vec<String> = registry.fields().iter().map(|f| f.key().to_string()).collect();
        if registry.classifies() {
            keys.push(TYPE_KEY.to_string());
        }
        Self { keys }
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
