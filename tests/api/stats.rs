use crate::helpers::{spawn_app, TABLE_PATH};
use chrono::{Duration as ChronoDuration, Local};
use claims::assert_ok;
use course_waitlist::store::CountFilter;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn the_live_counter_asks_for_an_exact_count() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(header("Prefer", "count=exact"))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-0/128"))
        .expect(1)
        .mount(&app.mock_store)
        .await;

    // Act + Assert
    let total = assert_ok!(app.store.count(&CountFilter::default()).await);
    assert_eq!(total, 128);
}

#[tokio::test]
async fn count_forwards_the_source_filter() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("source", "eq.landing-page"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-0/7"))
        .expect(1)
        .mount(&app.mock_store)
        .await;

    let filter = CountFilter {
        source: Some("landing-page".into()),
        ..Default::default()
    };
    let total = assert_ok!(app.store.count(&filter).await);
    assert_eq!(total, 7);
}

#[tokio::test]
async fn count_forwards_inclusive_date_bounds() {
    let app = spawn_app().await;

    let until = Local::now();
    let from = until - ChronoDuration::days(7);
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("submitted_at", format!("gte.{}", from.to_rfc3339())))
        .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-0/3"))
        .expect(1)
        .mount(&app.mock_store)
        .await;

    let filter = CountFilter {
        submitted_from: Some(from),
        submitted_until: Some(until),
        ..Default::default()
    };
    let total = assert_ok!(app.store.count(&filter).await);
    assert_eq!(total, 3);
}
