//! Navigation steps shared by the workflows
//!
//! Catalog-keyed clicks with the extractor's wait policy, and the pause
//! taken after every navigation or click.

use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::engine::FieldExtractor;
use crate::locator::{CatalogError, LocatorCatalog, ReadMode};
use crate::session::{DomSession, Scope, ScrollAction, SessionError};

/// Fixed pause plus bounded random jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    settle: Duration,
    jitter_ms: u64,
}

impl Pacing {
    #[must_use]
    pub fn new(settle: Duration, jitter_ms: u64) -> Self {
        Self { settle, jitter_ms }
    }

    /// No pauses at all; for offline sessions.
    #[must_use]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    #[must_use]
    pub fn next_delay(&self) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        };
        self.settle + Duration::from_millis(jitter)
    }

    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Catalog-driven navigation over one session
pub struct Navigator<'a, S: DomSession> {
    session: &'a S,
    catalog: &'a LocatorCatalog,
    extractor: FieldExtractor,
    pacing: Pacing,
    default_timeout_ms: u64,
}

impl<'a, S: DomSession> Navigator<'a, S> {
    #[must_use]
    pub fn new(
        session: &'a S,
        catalog: &'a LocatorCatalog,
        extractor: FieldExtractor,
        pacing: Pacing,
        default_timeout_ms: u64,
    ) -> Self {
        Self {
            session,
            catalog,
            extractor,
            pacing,
            default_timeout_ms,
        }
    }

    /// Load `url` and settle.
    pub async fn open(&self, url: &str) -> Result<(), SessionError> {
        info!("Opening {url}");
        self.session.navigate(url).await?;
        self.pacing.pause().await;
        Ok(())
    }

    /// One page-down and a settle, so lazily rendered sections load.
    ///
    /// Only a closed session is an error; other scroll failures are logged.
    pub async fn nudge(&self) -> Result<(), SessionError> {
        match self.session.scroll(&ScrollAction::PageDown).await {
            Ok(()) => self.pacing.pause().await,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!(error = %e, "Scroll failed"),
        }
        Ok(())
    }

    /// Click the element behind catalog `key`, waiting like a field lookup.
    ///
    /// `Ok(false)` when no candidate appeared in time.
    pub async fn click(&self, key: &str) -> Result<bool, NavigationError> {
        let chain = self
            .catalog
            .chain(key, &ReadMode::Text, self.default_timeout_ms)?;
        let clicked = self.extractor.click(self.session, Scope::Page, &chain).await?;
        if clicked {
            debug!(key, "Clicked");
            self.pacing.pause().await;
        }
        Ok(clicked)
    }

    /// [`Navigator::click`] that only logs failures; a closed session still propagates.
    pub async fn click_best_effort(&self, key: &str) -> Result<bool, SessionError> {
        match self.click(key).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!(key, "Click target not found");
                Ok(false)
            }
            Err(NavigationError::Session(e)) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(key, error = %e, "Click failed");
                Ok(false)
            }
        }
    }

    /// Type into the element behind catalog `key`, waiting for it to render.
    pub async fn type_into(&self, key: &str, text: &str, submit: bool) -> Result<bool, NavigationError> {
        let chain = self
            .catalog
            .chain(key, &ReadMode::Text, self.default_timeout_ms)?;
        let typed = self
            .extractor
            .type_text(self.session, &chain, text, submit)
            .await?;
        if typed {
            debug!(key, "Typed");
            self.pacing.pause().await;
        }
        Ok(typed)
    }

    #[must_use]
    pub fn session(&self) -> &'a S {
        self.session
    }

    #[must_use]
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }
}

/// Failure of a catalog-keyed navigation step
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_bounds() {
        let pacing = Pacing::new(Duration::from_millis(1000), 400);
        for _ in 0..100 {
            let delay = pacing.next_delay();
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(1400));
        }
        assert_eq!(Pacing::none().next_delay(), Duration::ZERO);
    }
}
