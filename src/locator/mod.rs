//! Locator catalog and locator value types
//!
//! Maps semantic keys ("channel_subscribers", "search_video_url", ...) to
//! ordered fallback chains of CSS or XPath candidates.

pub mod catalog;
pub mod types;

pub use catalog::{CatalogCandidate, CatalogEntry, CatalogError, LocatorCatalog};
pub use types::{LocatorChain, LocatorKind, LocatorSpec, ReadMode};
