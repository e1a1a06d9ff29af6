//! Jobs file model and job runner used by the binary
//!
//! A jobs file names the catalog, optional config overrides and a list of
//! jobs run in order against one browser session.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ScrapeConfig;
use crate::engine::ExtractedRecord;
use crate::session::{DomSession, SessionError};
use crate::utils::{extract_channel_handle, is_valid_url};
use crate::workflow::{ListingTab, Scraper, SortOrder};

/// Top-level jobs file
#[derive(Debug, Clone, Deserialize)]
pub struct JobsFile {
    /// Overrides the catalog path of `config`
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub config: ScrapeConfig,
    pub jobs: Vec<Job>,
}

impl JobsFile {
    /// Read, parse and validate a jobs file.
    ///
    /// A relative catalog path is resolved against the jobs file's directory.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read jobs file {}", path.display()))?;
        let mut file: JobsFile = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse jobs file {}", path.display()))?;

        let mut catalog = file
            .catalog
            .take()
            .unwrap_or_else(|| file.config.catalog_path.clone());
        if catalog.is_relative()
            && let Some(dir) = path.parent()
        {
            catalog = dir.join(catalog);
        }
        file.config = file.config.into_builder().catalog_path(catalog).build()?;

        for (index, job) in file.jobs.iter().enumerate() {
            if let Job::ChannelInfo { url, .. } | Job::ChannelListing { url, .. } = job
                && !is_valid_url(url)
            {
                bail!("Job {} has an invalid channel URL '{url}'", index + 1);
            }
        }
        Ok(file)
    }
}

/// One unit of work
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    ChannelInfo {
        url: String,
        #[serde(default)]
        fields: Option<Vec<String>>,
    },
    ChannelListing {
        url: String,
        #[serde(default)]
        tab: ListingTab,
        #[serde(default)]
        sort: SortOrder,
        #[serde(default)]
        fields: Option<Vec<String>>,
        /// Also visit each item's watch page
        #[serde(default)]
        enrich: Option<Vec<String>>,
    },
    Search {
        query: String,
        #[serde(default)]
        filters: Vec<String>,
        #[serde(default)]
        fields: Option<Vec<String>>,
        #[serde(default)]
        enrich: Option<Vec<String>>,
    },
}

impl Job {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Job::ChannelInfo { .. } => "channel_info",
            Job::ChannelListing { .. } => "channel_listing",
            Job::Search { .. } => "search",
        }
    }

    /// Human label: the channel handle or the search query
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Job::ChannelInfo { url, .. } | Job::ChannelListing { url, .. } => {
                extract_channel_handle(url).unwrap_or(url).to_string()
            }
            Job::Search { query, .. } => query.clone(),
        }
    }
}

/// Output document of one job
#[derive(Debug, Clone, Serialize)]
pub struct JobOutput {
    pub kind: &'static str,
    pub label: String,
    /// When the last record of the job was extracted
    pub scraped_at: DateTime<Utc>,
    pub records: Vec<ExtractedRecord>,
}

/// Run one job to completion.
pub async fn run_job<S: DomSession>(scraper: &Scraper, session: &S, job: &Job) -> Result<JobOutput> {
    info!(kind = job.kind(), label = %job.label(), "Running job");

    let records = match job {
        Job::ChannelInfo { url, fields } => {
            vec![scraper.channel_info(session, url, fields.as_deref()).await?]
        }
        Job::ChannelListing {
            url,
            tab,
            sort,
            fields,
            enrich,
        } => {
            let mut records = scraper
                .channel_listing(session, url, *tab, *sort, fields.as_deref())
                .await?;
            if let Some(keys) = enrich {
                scraper
                    .enrich_watch_pages(session, &mut records, non_empty(keys))
                    .await?;
            }
            records
        }
        Job::Search {
            query,
            filters,
            fields,
            enrich,
        } => {
            let mut records = scraper
                .search(session, query, filters, fields.as_deref())
                .await?;
            if let Some(keys) = enrich {
                scraper
                    .enrich_watch_pages(session, &mut records, non_empty(keys))
                    .await?;
            }
            records
        }
    };

    Ok(JobOutput {
        kind: job.kind(),
        label: job.label(),
        scraped_at: Utc::now(),
        records,
    })
}

/// An empty enrich list means "all watch-page fields".
fn non_empty(keys: &[String]) -> Option<&[String]> {
    if keys.is_empty() { None } else { Some(keys) }
}

/// Whether `error` was caused by the browser session going away.
#[must_use]
pub fn is_session_closed(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| cause.downcast_ref::<SessionError>().is_some_and(SessionError::is_fatal))
}
