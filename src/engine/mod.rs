//! Extraction engine
//!
//! Generic over [`crate::session::DomSession`] and parameterized by a
//! [`crate::registry::FieldRegistry`]:
//! - [`FieldExtractor`] walks one field's fallback chain
//! - [`PaginationController`] scrolls until the page stops growing
//! - [`EntityClassifier`] labels records Video / Shorts / Live / Unknown
//! - [`ExtractionPipeline`] ties them into ordered records

pub mod availability;
pub mod classifier;
pub mod errors;
pub mod extractor;
pub mod outcome;
pub mod pagination;
pub mod pipeline;
pub mod record;
pub mod retry;

pub use availability::{AvailabilityGate, EntityAvailability};
pub use classifier::{EntityClassifier, EntityType};
pub use errors::EngineError;
pub use extractor::FieldExtractor;
pub use outcome::{FieldOutcome, FieldValue};
pub use pagination::{
    PaginationController, PaginationOutcome, PaginationReport, PaginationSettings, PaginationState,
};
pub use pipeline::{ExtractionPipeline, STATUS_KEY};
pub use record::ExtractedRecord;
pub use retry::{RetryOutcome, RetryPolicy, retry_until};
