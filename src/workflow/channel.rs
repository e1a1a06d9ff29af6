//! Channel workflows: "about" data and video/shorts listings

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Scraper;
use crate::engine::ExtractedRecord;
use crate::registry::EntityDomain;
use crate::session::DomSession;

/// Listing tab of a channel page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingTab {
    #[default]
    Videos,
    Shorts,
}

impl ListingTab {
    #[must_use]
    pub fn domain(self) -> EntityDomain {
        match self {
            ListingTab::Videos => EntityDomain::ChannelVideos,
            ListingTab::Shorts => EntityDomain::ChannelShorts,
        }
    }

    /// Catalog key of the tab button
    #[must_use]
    pub fn button_key(self) -> &'static str {
        match self {
            ListingTab::Videos => "channel_video_button",
            ListingTab::Shorts => "channel_shorts_button",
        }
    }
}

/// Sort chip of a channel listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// The page default; no click
    #[default]
    Newest,
    Popular,
    Oldest,
}

impl SortOrder {
    /// Catalog key of the sort chip, `None` for the default order
    #[must_use]
    pub fn filter_key(self) -> Option<&'static str> {
        match self {
            SortOrder::Newest => None,
            SortOrder::Popular => Some("popular_filter"),
            SortOrder::Oldest => Some("old_filter"),
        }
    }
}

impl Scraper {
    /// Open a channel page and extract its page-scope record.
    pub async fn channel_info<S: DomSession>(
        &self,
        session: &S,
        channel_url: &str,
        keys: Option<&[String]>,
    ) -> Result<ExtractedRecord> {
        let registry = self.registry(EntityDomain::Channel)?;
        let selection = self.selection(&registry, keys)?;

        let nav = self.navigator(session);
        nav.open(channel_url)
            .await
            .with_context(|| format!("Failed to open channel {channel_url}"))?;

        let record = self
            .pipeline
            .run_page(session, &selection, &registry)
            .await
            .context("Channel info extraction failed")?;
        info!(fields = record.len(), "Channel info extracted");
        Ok(record)
    }

    /// Open a channel, switch to `tab`, apply `sort`, scroll to the end and
    /// extract every listed item.
    pub async fn channel_listing<S: DomSession>(
        &self,
        session: &S,
        channel_url: &str,
        tab: ListingTab,
        sort: SortOrder,
        keys: Option<&[String]>,
    ) -> Result<Vec<ExtractedRecord>> {
        let registry = self.registry(tab.domain())?;
        let selection = self.selection(&registry, keys)?;

        let nav = self.navigator(session);
        nav.open(channel_url)
            .await
            .with_context(|| format!("Failed to open channel {channel_url}"))?;

        if !nav.click_best_effort(tab.button_key()).await? {
            bail!("Channel tab '{}' not found on {channel_url}", tab.button_key());
        }
        if let Some(filter) = sort.filter_key() {
            nav.click_best_effort(filter).await?;
        }

        self.extract_listing(session, &registry, &selection).await
    }
}
