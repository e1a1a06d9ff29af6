//! Field extractor
//!
//! Resolves one field against one scope by walking its fallback chain.
//! Candidates are tried strictly in order; the first one that produces a
//! value wins and later candidates are never touched.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::outcome::FieldOutcome;
use super::retry::{RetryOutcome, RetryPolicy, retry_until};
use crate::locator::{LocatorChain, LocatorSpec};
use crate::registry::FieldDefinition;
use crate::session::{DomSession, Scope, SessionError};
use crate::utils::constants::LOCATOR_POLL_INTERVAL_MS;

/// Result of waiting on one candidate
enum Probe<T> {
    Hit(T),
    Expired,
    Skipped,
    Fault(SessionError),
}

/// Walks fallback chains with per-candidate waits
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    poll_interval: Duration,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(Duration::from_millis(LOCATOR_POLL_INTERVAL_MS))
    }
}

impl FieldExtractor {
    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Extract `field` under `scope`. Never fails; see [`FieldOutcome`].
    ///
    /// The field's pre-action, if any, is clicked once before the chain is
    /// walked. Its failure is logged and otherwise ignored, except a closed
    /// session, which is returned as a fault right away.
    pub async fn extract<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        field: &FieldDefinition,
    ) -> FieldOutcome {
        if let Some(pre) = field.pre_action() {
            match self.click(session, scope, pre).await {
                Ok(true) => debug!(field = %field.key(), "Pre-action clicked"),
                Ok(false) => warn!(field = %field.key(), "Pre-action target not found"),
                Err(e) if e.is_fatal() => return FieldOutcome::Fault(e),
                Err(e) => warn!(field = %field.key(), error = %e, "Pre-action failed"),
            }
        }

        match self.read_chain(session, scope, field.chain()).await {
            Ok(Some(raw)) => FieldOutcome::Found(field.transform().apply(raw)),
            Ok(None) => {
                warn!(
                    field = %field.key(),
                    candidates = field.chain().len(),
                    "Fallback chain exhausted"
                );
                FieldOutcome::NotFound
            }
            Err(e) => {
                error!(field = %field.key(), error = %e, "Unexpected fault while extracting field");
                FieldOutcome::Fault(e)
            }
        }
    }

    /// Read through `chain`: first candidate with a value wins.
    ///
    /// `Ok(None)` when every candidate expired or was skipped.
    pub async fn read_chain<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        chain: &LocatorChain,
    ) -> Result<Option<String>, SessionError> {
        for (index, candidate) in chain.into_iter().enumerate() {
            let probe = self
                .probe(candidate, |spec| session.read(scope, spec), Option::is_some)
                .await;
            match probe {
                Probe::Hit(value) => {
                    debug!(candidate = index, locator = %candidate, "Candidate matched");
                    return Ok(value);
                }
                Probe::Expired | Probe::Skipped => continue,
                Probe::Fault(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Click the first candidate of `chain` that appears in time.
    pub async fn click<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        chain: &LocatorChain,
    ) -> Result<bool, SessionError> {
        for candidate in chain {
            let probe = self
                .probe(candidate, |spec| session.click(scope, spec), |clicked| *clicked)
                .await;
            match probe {
                Probe::Hit(_) => return Ok(true),
                Probe::Expired | Probe::Skipped => continue,
                Probe::Fault(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Type `text` into the first candidate of `chain` that appears in time.
    pub async fn type_text<S: DomSession>(
        &self,
        session: &S,
        chain: &LocatorChain,
        text: &str,
        submit: bool,
    ) -> Result<bool, SessionError> {
        for candidate in chain {
            let probe = self
                .probe(candidate, |spec| session.type_text(spec, text, submit), |typed| *typed)
                .await;
            match probe {
                Probe::Hit(_) => return Ok(true),
                Probe::Expired | Probe::Skipped => continue,
                Probe::Fault(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// All nodes matched by the first candidate of `chain` that matches anything.
    pub async fn collect<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        chain: &LocatorChain,
    ) -> Result<Vec<S::Node>, SessionError> {
        for candidate in chain {
            let probe = self
                .probe(
                    candidate,
                    |spec| session.query_all(scope, spec),
                    |nodes: &Vec<S::Node>| !nodes.is_empty(),
                )
                .await;
            match probe {
                Probe::Hit(nodes) => return Ok(nodes),
                Probe::Expired | Probe::Skipped => continue,
                Probe::Fault(e) => return Err(e),
            }
        }
        Ok(Vec::new())
    }

    /// Presence test over `chain`.
    pub async fn exists<S: DomSession>(
        &self,
        session: &S,
        scope: Scope<'_, S::Node>,
        chain: &LocatorChain,
    ) -> Result<bool, SessionError> {
        for candidate in chain {
            let probe = self
                .probe(candidate, |spec| session.exists(scope, spec), |found| *found)
                .await;
            match probe {
                Probe::Hit(_) => return Ok(true),
                Probe::Expired | Probe::Skipped => continue,
                Probe::Fault(e) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Wait on one candidate for up to its timeout.
    async fn probe<'s, T, F, Fut, P>(&self, candidate: &'s LocatorSpec, mut command: F, accept: P) -> Probe<T>
    where
        F: FnMut(&'s LocatorSpec) -> Fut,
        Fut: Future<Output = Result<T, SessionError>>,
        P: FnMut(&T) -> bool,
    {
        let policy = RetryPolicy::for_wait(candidate.wait_timeout(), self.poll_interval);
        match retry_until(policy, |_| command(candidate), accept).await {
            RetryOutcome::Satisfied { value, .. } => Probe::Hit(value),
            RetryOutcome::Exhausted { attempts, .. } => {
                debug!(locator = %candidate, attempts, "Candidate wait expired");
                Probe::Expired
            }
            RetryOutcome::Failed { error, .. } if error.skips_candidate() => {
                warn!(locator = %candidate, error = %error, "Skipping candidate");
                Probe::Skipped
            }
            RetryOutcome::Failed { error, .. } => Probe::Fault(error),
        }
    }
}
