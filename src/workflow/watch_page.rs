//! Watch-page enrichment
//!
//! Visits the URL of each listing record and merges likes and comments
//! into it, using the video or short watch-page registry according to the
//! record's type.

use anyhow::Result;
use tracing::{info, warn};

use super::Scraper;
use crate::engine::{EngineError, EntityType, ExtractedRecord, FieldValue};
use crate::registry::{EntityDomain, FieldRegistry, FieldSelection, TYPE_KEY, URL_KEY};
use crate::session::DomSession;

impl Scraper {
    /// Enrich `records` in place; returns how many were visited.
    ///
    /// Records without a URL are skipped. A page that fails to load gets
    /// the sentinels of the requested fields; only a closed session stops
    /// the loop.
    pub async fn enrich_watch_pages<S: DomSession>(
        &self,
        session: &S,
        records: &mut [ExtractedRecord],
        keys: Option<&[String]>,
    ) -> Result<usize> {
        let video = self.registry(EntityDomain::VideoPage)?;
        let short = self.registry(EntityDomain::ShortPage)?;
        let video_selection = self.selection(&video, keys)?;
        let short_selection = self.selection(&short, keys)?;

        let nav = self.navigator(session);
        let total = records.len();
        let mut visited = 0;

        for (index, record) in records.iter_mut().enumerate() {
            let Some(url) = record.text(URL_KEY).map(str::to_string) else {
                warn!(record = index + 1, "Record has no URL, skipping watch page");
                continue;
            };

            let entity_type = record
                .text(TYPE_KEY)
                .and_then(EntityType::from_label)
                .unwrap_or_else(|| self.pipeline.classifier().classify(record));
            let (registry, selection) = if entity_type == EntityType::Shorts {
                (&short, &short_selection)
            } else {
                (&video, &video_selection)
            };

            info!(record = index + 1, total, url = %url, "Opening watch page");
            if let Err(e) = nav.open(&url).await {
                if e.is_fatal() {
                    return Err(EngineError::SessionClosed(e).into());
                }
                warn!(url = %url, error = %e, "Watch page failed to load");
                fill_sentinels(record, registry, selection);
                continue;
            }

            // Comments render below the fold
            if let Err(e) = nav.nudge().await {
                return Err(EngineError::SessionClosed(e).into());
            }

            let page = self.pipeline.run_page(session, selection, registry).await?;
            for (key, value) in page.iter().filter(|(key, _)| *key != TYPE_KEY) {
                record.insert(key, value.clone());
            }
            visited += 1;
        }

        Ok(visited)
    }
}

fn fill_sentinels(record: &mut ExtractedRecord, registry: &FieldRegistry, selection: &FieldSelection) {
    for key in selection.keys() {
        if let Some(field) = registry.get(key) {
            record.insert(
                key.as_str(),
                FieldValue::Missing {
                    sentinel: field.sentinel().to_string(),
                },
            );
        }
    }
}
