use crate::helpers::{record_body, spawn_app, TABLE_PATH};
use course_waitlist::controller::{EmailCheckState, FormPhase, SubmitOutcome};
use course_waitlist::domain::FormField;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn a_valid_signup_is_sanitized_before_it_reaches_the_store() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({
            "name": "John Doe",
            "email": "john@ex.com",
            "subscribed_newsletter": true,
            "source": "landing-page"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(record_body()))
        .expect(1)
        .mount(&app.mock_store)
        .await;

    // Act
    app.controller.update_field(FormField::Name, "  john doe  ");
    app.controller.update_field(FormField::Email, "JOHN@EX.COM");
    app.controller.set_subscribed(true);
    let outcome = app.controller.submit().await;

    // Assert
    match outcome {
        SubmitOutcome::Created(record) => {
            assert_eq!(record.email, "john@ex.com");
            assert_eq!(record.source, "landing-page");
        }
        other => panic!("expected Created, got {:?}", other),
    }
    assert_eq!(app.controller.phase(), FormPhase::Success);
}

#[tokio::test]
async fn a_duplicate_reported_by_the_store_is_a_distinct_error() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .expect(1)
        .mount(&app.mock_store)
        .await;

    // Act
    app.controller.update_field(FormField::Name, "Jane Doe");
    app.controller.update_field(FormField::Email, "jane@ex.com");
    let outcome = app.controller.submit().await;

    // Assert: worded differently from a validation failure, and the
    // probe state now agrees with the store.
    assert!(matches!(outcome, SubmitOutcome::DuplicateEmail));
    match app.controller.phase() {
        FormPhase::Error(message) => {
            assert!(message.contains("already exists"), "message: {}", message);
        }
        other => panic!("expected Error, got {:?}", other),
    }
    assert_eq!(app.controller.email_check(), EmailCheckState::Exists);
}

#[tokio::test]
async fn an_invalid_form_makes_no_network_calls() {
    // Arrange
    let app = spawn_app().await;
    // No mocks mounted: any request would show up below.

    // Act
    app.controller.update_field(FormField::Name, "j");
    let outcome = app.controller.submit().await;

    // Assert
    match outcome {
        SubmitOutcome::Rejected(errors) => {
            let fields: Vec<FormField> = errors.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec![FormField::Name, FormField::Email]);
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
    let requests = app
        .mock_store
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn a_transient_store_failure_is_retried_to_success() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.mock_store)
        .await;
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(record_body()))
        .expect(1)
        .mount(&app.mock_store)
        .await;

    // Act
    app.controller.update_field(FormField::Name, "John Doe");
    app.controller.update_field(FormField::Email, "john@ex.com");
    let outcome = app.controller.submit().await;

    // Assert: the retry happened inside the store client; the controller
    // only ever saw the final success.
    assert!(matches!(outcome, SubmitOutcome::Created(_)));
    assert_eq!(app.controller.phase(), FormPhase::Success);
}
