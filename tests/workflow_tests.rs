//! Navigation workflows against offline snapshot pages

use kodegen_tools_tubescrape::config::ScrapeConfig;
use kodegen_tools_tubescrape::engine::{ExtractedRecord, FieldValue};
use kodegen_tools_tubescrape::jobs::{Job, run_job};
use kodegen_tools_tubescrape::session::{DomSession, HtmlSnapshotSession};
use kodegen_tools_tubescrape::utils::PLATFORM_HOME_URL;
use kodegen_tools_tubescrape::workflow::{ListingTab, Pacing, Scraper, SortOrder};

mod common;
use common::{
    CHANNEL_URL, RecordingSession, fixture_catalog, page, url, video_item, video_listing,
};

fn scraper() -> Scraper {
    Scraper::new(ScrapeConfig::default(), fixture_catalog())
        .unwrap()
        .with_pacing(Pacing::none())
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| (*k).to_string()).collect()
}

/// Blank start page plus the channel page scrolling from 2 to 4 videos
fn channel_session() -> HtmlSnapshotSession {
    HtmlSnapshotSession::from_html("<html></html>")
        .with_page(url(CHANNEL_URL), [video_listing(2), video_listing(4)])
}

const CHANNEL_ABOUT: &str = r#"
    <h1>Fixture Channel</h1>
    <span id="handle">@fixture</span>
    <span id="subs">1.2M subscribers</span>
    <span id="count">340 videos</span>
    <button class="more">...more</button>
    <div id="description">Videos about fixtures.</div>
    <div id="links">example.com</div>
    <table><tr><td id="country">Norway</td></tr></table>
    <span id="joined">Joined Jan 1, 2015</span>
    <span id="views">12,345,678 views</span>
    <img class="banner" src="/banner.jpg">
    <img class="avatar" src="https://yt3.example.com/avatar.jpg">
    <button class="close">close</button>
"#;

#[tokio::test(start_paused = true)]
async fn channel_info_extracts_every_field_and_cleans_up() {
    let session = HtmlSnapshotSession::from_html("<html></html>")
        .with_page(url(CHANNEL_URL), [page(CHANNEL_ABOUT)]);

    let record = scraper().channel_info(&session, CHANNEL_URL, None).await.unwrap();

    assert_eq!(record.len(), 11);
    assert_eq!(record.text("full_name"), Some("Fixture Channel"));
    assert_eq!(record.text("main_description"), Some("Videos about fixtures."));
    assert_eq!(record.text("country"), Some("Norway"));
    assert_eq!(record.text("banner"), Some("https://www.youtube.com/banner.jpg"));
    assert_eq!(record.text("profile_picture"), Some("https://yt3.example.com/avatar.jpg"));
    assert_eq!(session.clicked(), vec!["button.more", "button.close"]);
}

#[tokio::test(start_paused = true)]
async fn channel_info_keeps_the_requested_subset_in_order() {
    let session = HtmlSnapshotSession::from_html("<html></html>")
        .with_page(url(CHANNEL_URL), [page("<h1>Sparse</h1>")]);

    let requested = keys(&["subscribers", "full_name"]);
    let record = scraper()
        .channel_info(&session, CHANNEL_URL, Some(&requested))
        .await
        .unwrap();

    assert_eq!(record.keys().collect::<Vec<_>>(), vec!["subscribers", "full_name"]);
    assert!(record.get("subscribers").unwrap().is_missing());
    assert_eq!(record.text("full_name"), Some("Sparse"));
}

#[tokio::test(start_paused = true)]
async fn channel_listing_scrolls_to_the_end_before_collecting() {
    let session = channel_session();
    let requested = keys(&["title", "url", "type"]);

    let records = scraper()
        .channel_listing(
            &session,
            CHANNEL_URL,
            ListingTab::Videos,
            SortOrder::Newest,
            Some(&requested),
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(session.frame_index(), 1);
    assert_eq!(session.clicked(), vec!["button.tab-videos"]);
    for (i, record) in records.iter().enumerate() {
        let n = i + 1;
        assert_eq!(record.text("title"), Some(format!("Video {n}").as_str()));
        assert_eq!(
            record.text("url"),
            Some(format!("https://www.youtube.com/watch?v={n}").as_str())
        );
        assert_eq!(record.text("type"), Some("Video"));
    }
}

#[tokio::test(start_paused = true)]
async fn absent_sort_chip_is_not_fatal() {
    let session = channel_session();
    let records = scraper()
        .channel_listing(&session, CHANNEL_URL, ListingTab::Videos, SortOrder::Popular, None)
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    // Default selection: every field plus the classified type
    assert_eq!(records[0].len(), 6);
}

#[tokio::test(start_paused = true)]
async fn missing_listing_tab_fails_the_workflow() {
    let session = channel_session();
    let err = scraper()
        .channel_listing(&session, CHANNEL_URL, ListingTab::Shorts, SortOrder::Newest, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("channel_shorts_button"));
}

#[tokio::test(start_paused = true)]
async fn unknown_listing_field_fails_before_navigation() {
    let session = channel_session();
    let requested = keys(&["title", "likes"]);
    let err = scraper()
        .channel_listing(
            &session,
            CHANNEL_URL,
            ListingTab::Videos,
            SortOrder::Newest,
            Some(&requested),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("likes"));
    assert_eq!(session.current_url().await, None);
}

fn search_home() -> String {
    let results: String = [
        ("Rust in 100 seconds", "/watch?v=r1", Some("1 year ago")),
        ("Rust tip", "/shorts/r2", None),
    ]
    .iter()
    .map(|(title, href, date)| {
        format!(
            r#"<div class="result">{}<a class="channel" href="/@rustlang">Rust</a></div>"#,
            video_item(title, href, "10K views", *date)
        )
    })
    .collect();
    page(&format!(
        r#"<input name="search_query">
           <button id="filters">Filters</button>
           <a class="filter-video">Video</a>
           {results}"#
    ))
}

#[tokio::test(start_paused = true)]
async fn search_types_the_query_applies_filters_and_extracts() {
    let session = HtmlSnapshotSession::from_html("<html></html>")
        .with_page(url(PLATFORM_HOME_URL), [search_home()]);
    let requested = keys(&["name", "channel_url", "type"]);

    let records = scraper()
        .search(&session, "rust", &keys(&["Video"]), Some(&requested))
        .await
        .unwrap();

    assert_eq!(session.typed(), vec!["rust"]);
    assert_eq!(session.clicked(), vec!["button#filters", "a.filter-video"]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text("name"), Some("Rust in 100 seconds"));
    assert_eq!(records[0].text("channel_url"), Some("https://www.youtube.com/@rustlang"));
    assert_eq!(records[0].text("type"), Some("Video"));
    assert_eq!(records[1].text("type"), Some("Shorts"));
}

#[tokio::test(start_paused = true)]
async fn search_waits_for_a_late_search_box() {
    let session = RecordingSession::new(
        HtmlSnapshotSession::from_html("<html></html>")
            .with_page(url(PLATFORM_HOME_URL), [search_home()]),
    )
    .render_input_after(2);

    let records = scraper()
        .search(&session, "rust", &[], Some(&keys(&["name"])))
        .await
        .unwrap();

    assert_eq!(session.inner().typed(), vec!["rust"]);
    let attempts = session.calls().iter().filter(|c| c.starts_with("type:")).count();
    assert_eq!(attempts, 3);
    assert_eq!(records.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unknown_search_filter_fails_before_navigation() {
    let session = HtmlSnapshotSession::from_html("<html></html>")
        .with_page(url(PLATFORM_HOME_URL), [search_home()]);

    let err = scraper()
        .search(&session, "rust", &keys(&["4K"]), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("search_filter_4k"));
    assert!(session.typed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_search_box_fails_the_search() {
    let session = HtmlSnapshotSession::from_html("<html></html>")
        .with_page(url(PLATFORM_HOME_URL), [page("<p>consent wall</p>")]);

    let err = scraper().search(&session, "rust", &[], None).await.unwrap_err();
    assert!(err.to_string().contains("Search box not found"));
}

#[tokio::test(start_paused = true)]
async fn watch_pages_enrich_listing_records() {
    let session = channel_session()
        .with_page(
            url("https://www.youtube.com/watch?v=1"),
            [page(r#"<button class="like" aria-label="12K likes">like</button><span id="comment-count">34</span>"#)],
        )
        .with_page(
            url("https://www.youtube.com/watch?v=2"),
            [page(r#"<span id="comment-count">0</span>"#)],
        );
    let scraper = scraper();
    let requested = keys(&["title", "url", "type"]);

    let mut records = scraper
        .channel_listing(
            &session,
            CHANNEL_URL,
            ListingTab::Videos,
            SortOrder::Newest,
            Some(&requested),
        )
        .await
        .unwrap();
    let visited = scraper
        .enrich_watch_pages(&session, &mut records, Some(&keys(&["likes", "comments"])))
        .await
        .unwrap();

    // Videos 3 and 4 have no captured watch page
    assert_eq!(visited, 2);
    assert_eq!(records[0].text("likes"), Some("12000"));
    assert_eq!(records[0].text("comments"), Some("34"));
    assert!(records[1].get("likes").unwrap().is_missing());
    assert_eq!(records[1].text("comments"), Some("0"));
    assert!(records[3].get("likes").unwrap().is_missing());
    assert_eq!(records[3].text("type"), Some("Video"));
    assert_eq!(
        records[0].keys().collect::<Vec<_>>(),
        vec!["title", "url", "type", "likes", "comments"]
    );
}

#[tokio::test(start_paused = true)]
async fn watch_page_scrolls_before_reading_lazy_comments() {
    let watch = "https://www.youtube.com/watch?v=lazy";
    let like = r#"<button class="like" aria-label="5 likes">like</button>"#;
    let session = HtmlSnapshotSession::from_html("<html></html>").with_page(
        url(watch),
        [
            page(like),
            page(&format!(r#"{like}<span id="comment-count">34</span>"#)),
        ],
    );
    let mut records = vec![ExtractedRecord::new()];
    records[0].insert("url", FieldValue::text(watch));
    records[0].insert("type", FieldValue::text("Video"));

    let visited = scraper()
        .enrich_watch_pages(&session, &mut records, Some(&keys(&["likes", "comments"])))
        .await
        .unwrap();

    assert_eq!(visited, 1);
    assert_eq!(session.frame_index(), 1);
    assert_eq!(records[0].text("likes"), Some("5"));
    assert_eq!(records[0].text("comments"), Some("34"));
}

#[tokio::test(start_paused = true)]
async fn channel_info_job_labels_output_with_the_handle() {
    let session = HtmlSnapshotSession::from_html("<html></html>")
        .with_page(url(CHANNEL_URL), [page(CHANNEL_ABOUT)]);
    let job: Job = serde_json::from_str(&format!(
        r#"{{"kind": "channel_info", "url": "{CHANNEL_URL}", "fields": ["name", "full_name"]}}"#
    ))
    .unwrap();

    let output = run_job(&scraper(), &session, &job).await.unwrap();
    let json = serde_json::to_value(&output).unwrap();

    assert_eq!(json["kind"], "channel_info");
    assert_eq!(json["label"], "fixture");
    assert_eq!(json["records"][0]["name"], "@fixture");
    assert_eq!(json["records"][0]["full_name"], "Fixture Channel");
}
