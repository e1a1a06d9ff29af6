//! Static per-domain field tables
//!
//! Each table lists the fields a domain offers, the catalog key that
//! locates them and the sentinel recorded when they cannot be found.
//! [`super::FieldRegistry::for_domain`] turns a table plus a
//! [`crate::locator::LocatorCatalog`] into a registry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::parse_compact_count;

/// Kind of entity a registry extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityDomain {
    /// Channel "about" data, page scope
    Channel,
    /// Items of a channel's videos tab
    ChannelVideos,
    /// Items of a channel's shorts tab
    ChannelShorts,
    /// Items of a search results page
    SearchResults,
    /// Watch page of a regular video, page scope
    VideoPage,
    /// Watch page of a short, page scope
    ShortPage,
}

impl EntityDomain {
    pub const ALL: [EntityDomain; 6] = [
        EntityDomain::Channel,
        EntityDomain::ChannelVideos,
        EntityDomain::ChannelShorts,
        EntityDomain::SearchResults,
        EntityDomain::VideoPage,
        EntityDomain::ShortPage,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityDomain::Channel => "channel",
            EntityDomain::ChannelVideos => "channel_videos",
            EntityDomain::ChannelShorts => "channel_shorts",
            EntityDomain::SearchResults => "search_results",
            EntityDomain::VideoPage => "video_page",
            EntityDomain::ShortPage => "short_page",
        }
    }

    #[must_use]
    pub fn table(self) -> &'static DomainTable {
        match self {
            EntityDomain::Channel => &CHANNEL,
            EntityDomain::ChannelVideos => &CHANNEL_VIDEOS,
            EntityDomain::ChannelShorts => &CHANNEL_SHORTS,
            EntityDomain::SearchResults => &SEARCH_RESULTS,
            EntityDomain::VideoPage => &VIDEO_PAGE,
            EntityDomain::ShortPage => &SHORT_PAGE,
        }
    }
}

impl fmt::Display for EntityDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post-processing applied to a found value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTransform {
    #[default]
    None,
    /// "12 тыс.", "1.5M" → "12000", "1500000"; unparseable labels are kept as read
    CompactCount,
}

impl ValueTransform {
    #[must_use]
    pub fn apply(self, raw: String) -> String {
        match self {
            ValueTransform::None => raw,
            ValueTransform::CompactCount => {
                parse_compact_count(&raw).map_or(raw, |count| count.to_string())
            }
        }
    }
}

/// How a table row reads its node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRead {
    Text,
    Attribute(&'static str),
}

/// One declared field
#[derive(Debug, Clone, Copy)]
pub struct FieldRow {
    pub key: &'static str,
    pub locator: &'static str,
    pub read: RowRead,
    pub sentinel: &'static str,
    pub pre_action: Option<&'static str>,
    pub transform: ValueTransform,
}

const fn text(key: &'static str, locator: &'static str, sentinel: &'static str) -> FieldRow {
    FieldRow {
        key,
        locator,
        read: RowRead::Text,
        sentinel,
        pre_action: None,
        transform: ValueTransform::None,
    }
}

const fn attr(
    key: &'static str,
    locator: &'static str,
    attribute: &'static str,
    sentinel: &'static str,
) -> FieldRow {
    FieldRow {
        read: RowRead::Attribute(attribute),
        ..text(key, locator, sentinel)
    }
}

/// Everything a registry needs to know about one domain
#[derive(Debug)]
pub struct DomainTable {
    pub domain: EntityDomain,
    pub fields: &'static [FieldRow],
    /// Catalog key of the listing item locator; `None` for page-scope domains
    pub item_locator: Option<&'static str>,
    /// Whether `type` is part of the domain's default selection
    pub classifies: bool,
    /// Optional catalog key of a "removed" marker inside an item
    pub removed_marker: Option<&'static str>,
    /// Optional catalog key of a "restricted" marker inside an item
    pub restricted_marker: Option<&'static str>,
    /// Optional catalog key clicked best-effort after a page-scope extraction
    pub cleanup: Option<&'static str>,
}

static CHANNEL_FIELDS: [FieldRow; 11] = [
    text("subscribers", "channel_subscribers", "Channel subscribers not found."),
    text("number_of_videos", "channel_number_videos", "Channel video count not found."),
    text("full_name", "channel_full_name", "Channel full name not found."),
    text("name", "channel_name", "Channel name not found."),
    FieldRow {
        pre_action: Some("channel_description_button"),
        ..text(
            "main_description",
            "channel_main_description",
            "Channel description not found.",
        )
    },
    text("links", "channel_links", "Channel links not found."),
    text("country", "channel_country", "Channel country not found."),
    text(
        "registration_date",
        "channel_registration_date",
        "Channel registration date not found.",
    ),
    text("total_views", "channel_total_views", "Channel total views not found."),
    attr("banner", "channel_banner", "src", "Channel banner not found."),
    attr(
        "profile_picture",
        "channel_profile_picture",
        "src",
        "Channel profile picture not found.",
    ),
];

static CHANNEL_VIDEO_FIELDS: [FieldRow; 5] = [
    text("title", "channel_video_title", "Video title not found."),
    attr("url", "channel_video_url", "href", "Video URL not found."),
    text("views", "channel_video_views", "Video views not found."),
    text(
        "release_date",
        "channel_video_release_date",
        "Video release date not found.",
    ),
    attr("preview", "channel_video_preview", "src", "Video preview not found."),
];

static CHANNEL_SHORTS_FIELDS: [FieldRow; 4] = [
    text("title", "channel_shorts_title", "Short title not found."),
    attr("url", "channel_shorts_url", "href", "Short URL not found."),
    text("views", "channel_shorts_views", "Short views not found."),
    attr("preview", "channel_shorts_preview", "src", "Short preview not found."),
];

static SEARCH_FIELDS: [FieldRow; 7] = [
    text("name", "search_video_title", "Video title not found."),
    attr("url", "search_video_url", "href", "Video URL not found."),
    text("views", "search_video_views", "Video views not found."),
    text(
        "release_date",
        "search_video_release_date",
        "Video release date not found.",
    ),
    text(
        "channel_name",
        "search_video_channel_name",
        "Channel name not found.",
    ),
    attr(
        "channel_url",
        "search_video_channel_url",
        "href",
        "Channel URL not found.",
    ),
    attr("preview", "search_video_preview", "src", "Video preview not found."),
];

static VIDEO_PAGE_FIELDS: [FieldRow; 2] = [
    FieldRow {
        transform: ValueTransform::CompactCount,
        ..attr("likes", "likes", "aria-label", "Video likes not found.")
    },
    text("comments", "comments", "Video comments not found."),
];

static SHORT_PAGE_FIELDS: [FieldRow; 2] = [
    FieldRow {
        transform: ValueTransform::CompactCount,
        ..text("likes", "shorts_likes", "Short likes not found.")
    },
    text("comments", "shorts_comments", "Short comments not found."),
];

pub static CHANNEL: DomainTable = DomainTable {
    domain: EntityDomain::Channel,
    fields: &CHANNEL_FIELDS,
    item_locator: None,
    classifies: false,
    removed_marker: None,
    restricted_marker: None,
    cleanup: Some("channel_description_close_button"),
};

pub static CHANNEL_VIDEOS: DomainTable = DomainTable {
    domain: EntityDomain::ChannelVideos,
    fields: &CHANNEL_VIDEO_FIELDS,
    item_locator: Some("channel_all_videos"),
    classifies: true,
    removed_marker: Some("channel_video_removed"),
    restricted_marker: Some("channel_video_restricted"),
    cleanup: None,
};

pub static CHANNEL_SHORTS: DomainTable = DomainTable {
    domain: EntityDomain::ChannelShorts,
    fields: &CHANNEL_SHORTS_FIELDS,
    item_locator: Some("channel_all_shorts"),
    classifies: true,
    removed_marker: Some("channel_shorts_removed"),
    restricted_marker: Some("channel_shorts_restricted"),
    cleanup: None,
};

pub static SEARCH_RESULTS: DomainTable = DomainTable {
    domain: EntityDomain::SearchResults,
    fields: &SEARCH_FIELDS,
    item_locator: Some("search_all_videos"),
    classifies: true,
    removed_marker: Some("search_video_removed"),
    restricted_marker: Some("search_video_restricted"),
    cleanup: None,
};

pub static VIDEO_PAGE: DomainTable = DomainTable {
    domain: EntityDomain::VideoPage,
    fields: &VIDEO_PAGE_FIELDS,
    item_locator: None,
    classifies: false,
    removed_marker: Some("video_page_removed"),
    restricted_marker: Some("video_page_restricted"),
    cleanup: None,
};

pub static SHORT_PAGE: DomainTable = DomainTable {
    domain: EntityDomain::ShortPage,
    fields: &SHORT_PAGE_FIELDS,
    item_locator: None,
    classifies: false,
    removed_marker: Some("short_page_removed"),
    restricted_marker: Some("short_page_restricted"),
    cleanup: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_per_table() {
        for domain in EntityDomain::ALL {
            let table = domain.table();
            assert_eq!(table.domain, domain);
            let keys: HashSet<_> = table.fields.iter().map(|row| row.key).collect();
            assert_eq!(keys.len(), table.fields.len(), "duplicate key in {domain}");
            assert!(!keys.contains("type"), "{domain} declares the synthetic key");
        }
    }

    #[test]
    fn listing_domains_have_item_locators() {
        for domain in [
            EntityDomain::ChannelVideos,
            EntityDomain::ChannelShorts,
            EntityDomain::SearchResults,
        ] {
            assert!(domain.table().item_locator.is_some());
            assert!(domain.table().classifies);
        }
        assert!(EntityDomain::Channel.table().item_locator.is_none());
    }

    #[test]
    fn compact_count_transform_keeps_unparseable_labels() {
        assert_eq!(
            ValueTransform::CompactCount.apply("вам и ещё 12 тыс. пользователям".into()),
            "12000"
        );
        assert_eq!(ValueTransform::CompactCount.apply("n/a".into()), "n/a");
        assert_eq!(ValueTransform::None.apply("12K".into()), "12K");
    }
}
