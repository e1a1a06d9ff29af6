//! Field extractor: fallback order, sentinels, pre-actions, skipped candidates

use kodegen_tools_tubescrape::engine::{FieldExtractor, FieldOutcome, FieldValue};
use kodegen_tools_tubescrape::locator::{LocatorChain, LocatorSpec, ReadMode};
use kodegen_tools_tubescrape::registry::{FieldDefinition, ValueTransform};
use kodegen_tools_tubescrape::session::{DomSession, Scope, SessionError};

mod common;
use common::{RecordingSession, page, snapshot};

fn title_field() -> FieldDefinition {
    let chain = LocatorChain::new(vec![
        LocatorSpec::css("span.title-primary").wait_ms(300),
        LocatorSpec::css("span.title-fallback").wait_ms(300),
    ])
    .unwrap();
    FieldDefinition::new("name", chain, "Video title not found.")
}

const TWO_ITEMS: &str = r#"
    <div class="item">
      <span class="title-primary">First</span>
      <span class="title-fallback">Ignored</span>
    </div>
    <div class="item">
      <span class="title-fallback">Second</span>
    </div>
"#;

#[tokio::test(start_paused = true)]
async fn first_matching_candidate_wins_and_later_ones_are_not_tried() {
    let session = RecordingSession::new(snapshot(&page(TWO_ITEMS)));
    let items = session
        .inner()
        .query_all(Scope::Page, &LocatorSpec::css("div.item"))
        .await
        .unwrap();
    let extractor = FieldExtractor::default();

    let outcome = extractor
        .extract(&session, Scope::Node(&items[0]), &title_field())
        .await;
    assert!(matches!(outcome, FieldOutcome::Found(ref v) if v == "First"));
    assert_eq!(session.calls(), vec!["read:span.title-primary"]);
}

#[tokio::test(start_paused = true)]
async fn expired_candidate_falls_through_to_the_next() {
    let session = RecordingSession::new(snapshot(&page(TWO_ITEMS)));
    let items = session
        .inner()
        .query_all(Scope::Page, &LocatorSpec::css("div.item"))
        .await
        .unwrap();
    let extractor = FieldExtractor::default();

    let outcome = extractor
        .extract(&session, Scope::Node(&items[1]), &title_field())
        .await;
    assert!(matches!(outcome, FieldOutcome::Found(ref v) if v == "Second"));

    let calls = session.calls();
    // The primary candidate is polled until its wait expires, then the fallback hits once.
    assert!(calls.len() >= 2);
    assert_eq!(calls.last().map(String::as_str), Some("read:span.title-fallback"));
    assert!(
        calls[..calls.len() - 1]
            .iter()
            .all(|c| c == "read:span.title-primary")
    );
}

#[tokio::test(start_paused = true)]
async fn same_inputs_give_the_same_outcome() {
    let extractor = FieldExtractor::default();
    let mut values = Vec::new();
    for _ in 0..3 {
        let session = snapshot(&page(TWO_ITEMS));
        let items = session
            .query_all(Scope::Page, &LocatorSpec::css("div.item"))
            .await
            .unwrap();
        let outcome = extractor
            .extract(&session, Scope::Node(&items[1]), &title_field())
            .await;
        values.push(outcome.into_value("missing"));
    }
    assert!(values.iter().all(|v| v == &FieldValue::text("Second")));
}

#[tokio::test(start_paused = true)]
async fn exhausted_chain_is_not_found_and_empty_text_is_found() {
    let session = snapshot(&page(
        r#"<div class="item"><span class="views"></span></div>"#,
    ));
    let extractor = FieldExtractor::default();

    let views = FieldDefinition::new(
        "views",
        LocatorChain::single(LocatorSpec::css("span.views").wait_ms(200)),
        "Video views not found.",
    );
    let date = FieldDefinition::new(
        "release_date",
        LocatorChain::single(LocatorSpec::css("span.date").wait_ms(200)),
        "Video release date not found.",
    );

    let found = extractor.extract(&session, Scope::Page, &views).await;
    let missing = extractor.extract(&session, Scope::Page, &date).await;

    assert_eq!(found.into_value(views.sentinel()), FieldValue::text(""));
    assert!(matches!(missing, FieldOutcome::NotFound));
    let value = missing.into_value(date.sentinel());
    assert!(value.is_missing());
    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        serde_json::json!("Video release date not found.")
    );
}

#[tokio::test(start_paused = true)]
async fn missing_attribute_counts_as_not_found() {
    let session = snapshot(&page(r#"<a class="title">No link</a>"#));
    let field = FieldDefinition::new(
        "url",
        LocatorChain::single(
            LocatorSpec::css("a.title")
                .read(ReadMode::attribute("href"))
                .wait_ms(200),
        ),
        "Video URL not found.",
    );
    let outcome = FieldExtractor::default()
        .extract(&session, Scope::Page, &field)
        .await;
    assert!(matches!(outcome, FieldOutcome::NotFound));
}

#[tokio::test(start_paused = true)]
async fn pre_action_runs_once_before_the_read() {
    let session = snapshot(&page(
        r#"<button class="more">...more</button><div id="description">Full text</div>"#,
    ));
    let field = FieldDefinition::new(
        "main_description",
        LocatorChain::single(LocatorSpec::css("#description").wait_ms(200)),
        "Channel description not found.",
    )
    .with_pre_action(LocatorChain::single(LocatorSpec::css("button.more").wait_ms(200)));

    let outcome = FieldExtractor::default()
        .extract(&session, Scope::Page, &field)
        .await;
    assert!(matches!(outcome, FieldOutcome::Found(ref v) if v == "Full text"));
    assert_eq!(session.clicked(), vec!["button.more"]);
}

#[tokio::test(start_paused = true)]
async fn missing_pre_action_target_does_not_block_the_read() {
    let session = snapshot(&page(r#"<div id="description">Short text</div>"#));
    let field = FieldDefinition::new(
        "main_description",
        LocatorChain::single(LocatorSpec::css("#description").wait_ms(200)),
        "Channel description not found.",
    )
    .with_pre_action(LocatorChain::single(LocatorSpec::css("button.more").wait_ms(200)));

    let outcome = FieldExtractor::default()
        .extract(&session, Scope::Page, &field)
        .await;
    assert!(matches!(outcome, FieldOutcome::Found(ref v) if v == "Short text"));
    assert!(session.clicked().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unsupported_candidate_is_skipped() {
    let session = snapshot(&page(r#"<span id="country">Norway</span>"#));
    let field = FieldDefinition::new(
        "country",
        LocatorChain::new(vec![
            LocatorSpec::xpath("//span[@id='country']").wait_ms(200),
            LocatorSpec::css("#country").wait_ms(200),
        ])
        .unwrap(),
        "Channel country not found.",
    );
    let outcome = FieldExtractor::default()
        .extract(&session, Scope::Page, &field)
        .await;
    assert!(matches!(outcome, FieldOutcome::Found(ref v) if v == "Norway"));
}

#[tokio::test(start_paused = true)]
async fn compact_count_transform_applies_to_found_values() {
    let session = snapshot(&page(
        r#"<button class="like" aria-label="1,2 тыс. отметок">like</button>"#,
    ));
    let field = FieldDefinition::new(
        "likes",
        LocatorChain::single(
            LocatorSpec::css("button.like")
                .read(ReadMode::attribute("aria-label"))
                .wait_ms(200),
        ),
        "Likes not found.",
    )
    .with_transform(ValueTransform::CompactCount);

    let outcome = FieldExtractor::default()
        .extract(&session, Scope::Page, &field)
        .await;
    assert!(matches!(outcome, FieldOutcome::Found(ref v) if v == "1200"));
}

#[tokio::test(start_paused = true)]
async fn closed_session_is_reported_as_a_fatal_fault() {
    let session = RecordingSession::new(snapshot(&page("<p>x</p>"))).close_after(0);
    let outcome = FieldExtractor::default()
        .extract(&session, Scope::Page, &title_field())
        .await;
    let fatal = outcome.fatal_error().cloned();
    assert!(matches!(fatal, Some(SessionError::Closed(_))));
}
