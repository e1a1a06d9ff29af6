//! Configuration module for scraping runs
//!
//! This module provides the `ScrapeConfig` struct and its type-safe builder
//! with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{ScrapeConfigBuilder, WithCatalog};
pub use types::{DEFAULT_CATALOG_PATH, ScrapeConfig};
