//! Entity classifier
//!
//! Decides Video / Shorts / Live / Unknown from the `url` and
//! `release_date` signals of a record. The URL rule runs first, so a short
//! without a release date is still a short.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::ExtractedRecord;
use crate::registry::{RELEASE_DATE_KEY, URL_KEY};
use crate::utils::constants::SHORT_FORM_URL_PATTERN;

static DEFAULT_SHORT_FORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(SHORT_FORM_URL_PATTERN).expect("Invalid short-form URL regex"));

/// Kind of a listed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Video,
    Shorts,
    Live,
    Unknown,
}

impl EntityType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Video => "Video",
            EntityType::Shorts => "Shorts",
            EntityType::Live => "Live",
            EntityType::Unknown => "Unknown",
        }
    }

    /// Parse the string written into a record's `type` field.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Video" => Some(EntityType::Video),
            "Shorts" => Some(EntityType::Shorts),
            "Live" => Some(EntityType::Live),
            "Unknown" => Some(EntityType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies records by URL shape and release-date presence
#[derive(Debug, Clone)]
pub struct EntityClassifier {
    short_form: Regex,
}

impl Default for EntityClassifier {
    fn default() -> Self {
        Self {
            short_form: DEFAULT_SHORT_FORM.clone(),
        }
    }
}

impl EntityClassifier {
    /// Classifier with a custom short-form URL pattern.
    pub fn new(short_form_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            short_form: Regex::new(short_form_pattern)?,
        })
    }

    /// First matching rule wins:
    /// 1. no `url` and no `release_date` key at all → Unknown
    /// 2. `url` text matches the short-form pattern → Shorts
    /// 3. `release_date` absent, sentinel, null or blank → Live
    /// 4. otherwise → Video
    #[must_use]
    pub fn classify(&self, record: &ExtractedRecord) -> EntityType {
        let url = record.get(URL_KEY);
        let release_date = record.get(RELEASE_DATE_KEY);

        if url.is_none() && release_date.is_none() {
            return EntityType::Unknown;
        }

        if url
            .and_then(|v| v.as_text())
            .is_some_and(|u| self.short_form.is_match(u))
        {
            return EntityType::Shorts;
        }

        match release_date.and_then(|v| v.as_text()) {
            Some(date) if !date.trim().is_empty() => EntityType::Video,
            _ => EntityType::Live,
        }
    }
}
