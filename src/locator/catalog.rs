//! Locator catalog: semantic key → fallback chain
//!
//! The catalog is a flat JSON object. Each value is one of
//!
//! - a single expression: `"#subscriber-count"`
//! - an ordered fallback list: `["#video-title", "a#video-title-link"]`
//! - a candidate object: `{"css": "a#thumbnail", "attribute": "href", "timeout_ms": 1500}`
//! - a detailed entry: `{"candidates": [...], "timeout_ms": 500, "sentinel": "..."}`
//!
//! Bare strings are CSS unless prefixed with `xpath:` or starting with `/`.
//! Keys starting with `_` are treated as comments.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::types::{LocatorChain, LocatorKind, LocatorSpec, ReadMode};

/// Errors raised while loading or querying a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read locator catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse locator catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid catalog entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("Locator catalog has no entry for '{0}'")]
    MissingKey(String),
}

/// One candidate as written in the catalog, before table defaults apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCandidate {
    pub kind: LocatorKind,
    pub expression: String,
    pub attribute: Option<String>,
    pub wait_timeout_ms: Option<u64>,
    pub require_visible: bool,
}

/// All candidates for one key plus entry-level metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub candidates: Vec<CatalogCandidate>,
    pub sentinel: Option<String>,
}

/// Immutable map of semantic keys to locator candidates
#[derive(Debug, Clone, Default)]
pub struct LocatorCatalog {
    entries: HashMap<String, CatalogEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Chain(Vec<RawCandidate>),
    Detailed(RawDetailed),
    Single(RawCandidate),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCandidate {
    Expression(String),
    Spec(RawSpec),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpec {
    css: Option<String>,
    xpath: Option<String>,
    selector: Option<String>,
    attribute: Option<String>,
    timeout_ms: Option<u64>,
    visible: Option<bool>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDetailed {
    candidates: Vec<RawCandidate>,
    attribute: Option<String>,
    timeout_ms: Option<u64>,
    visible: Option<bool>,
    sentinel: Option<String>,
}

impl RawCandidate {
    fn into_candidate(self, key: &str) -> Result<CatalogCandidate, CatalogError> {
        match self {
            RawCandidate::Expression(expr) => {
                let (kind, expression) = LocatorKind::infer(&expr);
                if expression.is_empty() {
                    return Err(invalid(key, "empty locator expression"));
                }
                Ok(CatalogCandidate {
                    kind,
                    expression: expression.to_string(),
                    attribute: None,
                    wait_timeout_ms: None,
                    require_visible: false,
                })
            }
            RawCandidate::Spec(spec) => {
                let (kind, expression) = match (spec.css, spec.xpath, spec.selector) {
                    (Some(css), None, None) => (LocatorKind::Css, css),
                    (None, Some(xpath), None) => (LocatorKind::Xpath, xpath),
                    (None, None, Some(selector)) => {
                        let (kind, expr) = LocatorKind::infer(&selector);
                        (kind, expr.to_string())
                    }
                    _ => {
                        return Err(invalid(
                            key,
                            "candidate needs exactly one of 'css', 'xpath' or 'selector'",
                        ));
                    }
                };
                if expression.trim().is_empty() {
                    return Err(invalid(key, "empty locator expression"));
                }
                Ok(CatalogCandidate {
                    kind,
                    expression: expression.trim().to_string(),
                    attribute: spec.attribute,
                    wait_timeout_ms: spec.timeout_ms,
                    require_visible: spec.visible.unwrap_or(false),
                })
            }
        }
    }
}

fn invalid(key: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidEntry {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

impl RawEntry {
    fn into_entry(self, key: &str) -> Result<CatalogEntry, CatalogError> {
        let (raw, attribute, timeout_ms, visible, sentinel) = match self {
            RawEntry::Single(c) => (vec![c], None, None, None, None),
            RawEntry::Chain(list) => (list, None, None, None, None),
            RawEntry::Detailed(d) => (d.candidates, d.attribute, d.timeout_ms, d.visible, d.sentinel),
        };

        if raw.is_empty() {
            return Err(invalid(key, "fallback chain is empty"));
        }

        let candidates = raw
            .into_iter()
            .map(|c| {
                let mut candidate = c.into_candidate(key)?;
                // Entry-level metadata fills in what the candidate left open
                if candidate.attribute.is_none() {
                    candidate.attribute.clone_from(&attribute);
                }
                if candidate.wait_timeout_ms.is_none() {
                    candidate.wait_timeout_ms = timeout_ms;
                }
                candidate.require_visible |= visible.unwrap_or(false);
                Ok(candidate)
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(CatalogEntry { candidates, sentinel })
    }
}

impl LocatorCatalog {
    /// Empty catalog, filled with [`LocatorCatalog::insert`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut entries = HashMap::with_capacity(raw.len());

        for (key, value) in raw {
            if key.starts_with('_') {
                continue;
            }
            let entry: RawEntry = serde_json::from_value(value)
                .map_err(|e| invalid(&key, &e.to_string()))?;
            let entry = entry.into_entry(&key)?;
            debug!(key = %key, candidates = entry.candidates.len(), "Loaded catalog entry");
            entries.insert(key, entry);
        }

        Ok(Self { entries })
    }

    /// Read and parse a catalog file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_json_str(&text)?;
        info!(
            "Loaded locator catalog from {} ({} entries)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Add or replace an entry built in code.
    pub fn insert(&mut self, key: impl Into<String>, candidates: Vec<LocatorSpec>) -> &mut Self {
        let candidates = candidates
            .into_iter()
            .map(|spec| CatalogCandidate {
                kind: spec.kind,
                expression: spec.expression,
                attribute: match spec.mode {
                    ReadMode::Attribute(name) => Some(name),
                    ReadMode::Text => None,
                },
                wait_timeout_ms: Some(spec.wait_timeout_ms),
                require_visible: spec.require_visible,
            })
            .collect();
        self.entries.insert(
            key.into(),
            CatalogEntry {
                candidates,
                sentinel: None,
            },
        );
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve `key` into a chain, applying defaults for mode and timeout.
    ///
    /// A candidate's own attribute wins over `default_mode`.
    pub fn chain(
        &self,
        key: &str,
        default_mode: &ReadMode,
        default_timeout_ms: u64,
    ) -> Result<LocatorChain, CatalogError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| CatalogError::MissingKey(key.to_string()))?;

        let specs = entry
            .candidates
            .iter()
            .map(|c| LocatorSpec {
                kind: c.kind,
                expression: c.expression.clone(),
                mode: c
                    .attribute
                    .as_ref()
                    .map_or_else(|| default_mode.clone(), |name| ReadMode::Attribute(name.clone())),
                wait_timeout_ms: c.wait_timeout_ms.unwrap_or(default_timeout_ms),
                require_visible: c.require_visible,
            })
            .collect();

        LocatorChain::new(specs).ok_or_else(|| invalid(key, "fallback chain is empty"))
    }

    /// Sentinel override declared on the entry, if any
    #[must_use]
    pub fn sentinel(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|e| e.sentinel.as_deref())
    }
}
