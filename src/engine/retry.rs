//! Bounded retry combinator
//!
//! One loop shared by locator waits, availability probes and pagination:
//! run an action, test its value, sleep, repeat until the predicate holds
//! or the attempt budget is spent. An `Err` from the action stops the loop
//! immediately; classifying errors is the caller's job.

use std::future::Future;
use std::time::Duration;

/// Attempt budget and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Poll every `interval` for up to `timeout`.
    ///
    /// Always at least one attempt, so a zero timeout is a single probe.
    #[must_use]
    pub fn for_wait(timeout: Duration, interval: Duration) -> Self {
        let attempts = if interval.is_zero() {
            1
        } else {
            let polls = timeout.as_millis() / interval.as_millis().max(1);
            u32::try_from(polls).unwrap_or(u32::MAX).saturating_add(1)
        };
        Self::new(interval, attempts)
    }
}

/// How a retry loop ended
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// Predicate held on `value`
    Satisfied { value: T, attempts: u32 },
    /// Budget spent; `last` is the final value produced
    Exhausted { last: T, attempts: u32 },
    /// The action failed
    Failed { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Satisfied { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Run `action` until `predicate` accepts its value.
///
/// `action` receives the 1-based attempt number. The loop sleeps
/// `policy.interval` between attempts, never after the last one.
pub async fn retry_until<F, Fut, T, E, P>(
    policy: RetryPolicy,
    mut action: F,
    mut predicate: P,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let value = match action(attempt).await {
            Ok(value) => value,
            Err(error) => {
                return RetryOutcome::Failed {
                    error,
                    attempts: attempt,
                };
            }
        };

        if predicate(&value) {
            return RetryOutcome::Satisfied {
                value,
                attempts: attempt,
            };
        }

        if attempt >= policy.max_attempts {
            return RetryOutcome::Exhausted {
                last: value,
                attempts: attempt,
            };
        }

        tokio::time::sleep(policy.interval).await;
    }
}
