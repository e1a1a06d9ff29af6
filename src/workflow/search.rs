//! Search workflow

use anyhow::{Context, Result, bail};
use tracing::info;

use super::Scraper;
use crate::engine::ExtractedRecord;
use crate::registry::EntityDomain;
use crate::session::DomSession;
use crate::utils::constants::PLATFORM_HOME_URL;

/// Catalog key of the search box
pub const SEARCH_INPUT_KEY: &str = "search_input";
/// Catalog key of the button that focuses the search box
pub const SEARCH_BAR_BUTTON_KEY: &str = "search_bar_button";
/// Catalog key of the button that opens the filter panel
pub const SEARCH_FILTERS_BUTTON_KEY: &str = "search_filters_button";

/// Catalog key of a named search filter
#[must_use]
pub fn search_filter_key(name: &str) -> String {
    format!("search_filter_{}", name.trim().to_lowercase().replace([' ', '-'], "_"))
}

impl Scraper {
    /// Run `query` from the home page, apply `filters`, scroll the results
    /// to the end and extract every result.
    ///
    /// Filters are names resolved as `search_filter_<name>` catalog keys;
    /// unknown names fail before the browser is touched.
    pub async fn search<S: DomSession>(
        &self,
        session: &S,
        query: &str,
        filters: &[String],
        keys: Option<&[String]>,
    ) -> Result<Vec<ExtractedRecord>> {
        let registry = self.registry(EntityDomain::SearchResults)?;
        let selection = self.selection(&registry, keys)?;

        let filter_keys: Vec<String> = filters.iter().map(|f| search_filter_key(f)).collect();
        if let Some(missing) = filter_keys.iter().find(|k| !self.catalog.contains(k)) {
            bail!("Unknown search filter: catalog has no '{missing}'");
        }

        let nav = self.navigator(session);
        nav.open(PLATFORM_HOME_URL)
            .await
            .context("Failed to open the home page")?;

        nav.click_best_effort(SEARCH_BAR_BUTTON_KEY).await?;
        if !nav
            .type_into(SEARCH_INPUT_KEY, query, true)
            .await
            .context("Failed to type the search query")?
        {
            bail!("Search box not found");
        }
        info!(query, "Search submitted");

        for key in &filter_keys {
            nav.click_best_effort(SEARCH_FILTERS_BUTTON_KEY).await?;
            nav.click_best_effort(key).await?;
        }

        self.extract_listing(session, &registry, &selection).await
    }
}
