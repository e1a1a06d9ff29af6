//! Availability gate
//!
//! Short presence probes for "removed" and "restricted" markers, run once
//! per entity before any field work.

use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use super::extractor::FieldExtractor;
use crate::locator::LocatorChain;
use crate::registry::AvailabilityMarkers;
use crate::session::{DomSession, Scope, SessionError};
use crate::utils::constants::AVAILABILITY_PROBE_TIMEOUT_MS;

/// Availability of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityAvailability {
    Available,
    Removed,
    Restricted,
}

impl EntityAvailability {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityAvailability::Available => "available",
            EntityAvailability::Removed => "removed",
            EntityAvailability::Restricted => "restricted",
        }
    }

    #[must_use]
    pub fn is_available(self) -> bool {
        self == EntityAvailability::Available
    }
}

impl fmt::Display for EntityAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs marker probes with a capped wait
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityGate {
    extractor: FieldExtractor,
    probe_timeout_ms: u64,
}

impl Default for AvailabilityGate {
    fn default() -> Self {
        Self::new(FieldExtractor::default(), AVAILABILITY_PROBE_TIMEOUT_MS)
    }
}

impl AvailabilityGate {
    #[must_use]
    pub fn new(extractor: FieldExtractor, probe_timeout_ms: u64) -> Self {
        Self {
            extractor,
            probe_timeout_ms,
        }
    }

    /// Probe `markers` under `scope`; removed is checked before restricted.
    ///
    /// Non-fatal probe errors count as "marker absent".
    pub async fn check<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        markers: &AvailabilityMarkers,
    ) -> Result<EntityAvailability, SessionError> {
        let probes = [
            (markers.removed.as_ref(), EntityAvailability::Removed),
            (markers.restricted.as_ref(), EntityAvailability::Restricted),
        ];

        for (marker, status) in probes {
            let Some(chain) = marker else { continue };
            if self.present(session, scope, chain).await? {
                debug!(status = %status, "Entity unavailable");
                return Ok(status);
            }
        }
        Ok(EntityAvailability::Available)
    }

    async fn present<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        chain: &LocatorChain,
    ) -> Result<bool, SessionError> {
        let capped = chain.capped_wait(self.probe_timeout_ms);
        match self.extractor.exists(session, scope, &capped).await {
            Ok(found) => Ok(found),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "Availability probe failed, assuming available");
                Ok(false)
            }
        }
    }
}
