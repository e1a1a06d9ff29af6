//! Pagination controller
//!
//! Drives an infinite-scroll page until a progress signal stops changing.
//! Each iteration is one scroll, one poll-interval pause and one
//! measurement. The iteration cap ends the loop as stable with a warning;
//! nothing else cancels it.

use std::cell::Cell;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::retry::{RetryOutcome, RetryPolicy, retry_until};
use crate::session::{DomSession, ProgressSignal, ScrollAction, SessionError};
use crate::utils::constants::{MAX_SCROLL_ITERATIONS, PAGINATION_POLL_INTERVAL_MS, STABLE_CONFIRMATIONS};

/// Tunables of one pagination run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub action: ScrollAction,
    pub signal: ProgressSignal,
    pub poll_interval_ms: u64,
    pub max_iterations: u32,
    /// Consecutive unchanged measurements required
    pub confirmations: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            action: ScrollAction::PageDown,
            signal: ProgressSignal::VerticalOffset,
            poll_interval_ms: PAGINATION_POLL_INTERVAL_MS,
            max_iterations: MAX_SCROLL_ITERATIONS,
            confirmations: STABLE_CONFIRMATIONS,
        }
    }
}

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Scrolling,
    Measuring,
    Stable,
}

/// Why the controller reported the page as stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationOutcome {
    /// The signal stopped changing
    Settled,
    /// The iteration cap was hit first
    CapReached,
    /// A non-fatal session error ended the loop early
    Interrupted,
}

/// Summary of one [`PaginationController::stabilize`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationReport {
    /// Scroll actions performed
    pub iterations: u32,
    /// Last measured signal value
    pub final_signal: u64,
    pub outcome: PaginationOutcome,
}

/// Scroll-until-stable loop over a [`DomSession`]
#[derive(Debug, Clone, Default)]
pub struct PaginationController {
    settings: PaginationSettings,
}

impl PaginationController {
    #[must_use]
    pub fn new(settings: PaginationSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &PaginationSettings {
        &self.settings
    }

    /// Scroll until stable.
    ///
    /// Only a fatal session error is returned; any other error is logged
    /// and reported as [`PaginationOutcome::Interrupted`].
    pub async fn stabilize<S: DomSession>(
        &self,
        session: &S,
    ) -> Result<PaginationReport, SessionError> {
        let settings = &self.settings;
        let confirmations = settings.confirmations.max(1);
        // One measurement more than scrolls: the baseline plus one per scroll.
        let max_attempts = settings.max_iterations.max(1).saturating_add(1);
        let policy = RetryPolicy::new(Duration::from_millis(settings.poll_interval_ms), max_attempts);

        let previous: Cell<Option<u64>> = Cell::new(None);
        let streak = Cell::new(0u32);
        let scrolls = Cell::new(0u32);
        let (previous, streak, scrolls) = (&previous, &streak, &scrolls);

        info!(
            signal = ?settings.signal,
            max_iterations = settings.max_iterations,
            "Starting pagination"
        );

        let outcome = retry_until(
            policy,
            move |attempt| async move {
                trace!(state = ?PaginationState::Measuring, attempt);
                let value = session.measure(&settings.signal).await?;

                let stable = match previous.replace(Some(value)) {
                    Some(prev) if prev == value => {
                        streak.set(streak.get() + 1);
                        streak.get() >= confirmations
                    }
                    _ => {
                        streak.set(0);
                        false
                    }
                };

                if !stable && attempt < max_attempts {
                    trace!(state = ?PaginationState::Scrolling, attempt);
                    session.scroll(&settings.action).await?;
                    scrolls.set(scrolls.get() + 1);
                }
                Ok::<_, SessionError>((value, stable))
            },
            |(_, stable)| *stable,
        )
        .await;

        let report = |final_signal: u64, outcome: PaginationOutcome| PaginationReport {
            iterations: scrolls.get(),
            final_signal,
            outcome,
        };

        match outcome {
            RetryOutcome::Satisfied { value: (value, _), .. } => {
                debug!(state = ?PaginationState::Stable, iterations = scrolls.get(), signal = value, "Page stable");
                Ok(report(value, PaginationOutcome::Settled))
            }
            RetryOutcome::Exhausted { last: (value, _), .. } => {
                warn!(
                    iterations = scrolls.get(),
                    signal = value,
                    "Pagination cap reached before the page settled, treating as complete"
                );
                Ok(report(value, PaginationOutcome::CapReached))
            }
            RetryOutcome::Failed { error, .. } if error.is_fatal() => Err(error),
            RetryOutcome::Failed { error, .. } => {
                warn!(error = %error, iterations = scrolls.get(), "Pagination interrupted, treating as complete");
                Ok(report(previous.get().unwrap_or_default(), PaginationOutcome::Interrupted))
            }
        }
    }
}
