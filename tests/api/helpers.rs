use course_waitlist::controller::{ControllerConfig, FormController};
use course_waitlist::store::{RemoteStore, RetryConfig, SubmissionStore};
use course_waitlist::telemetry;
use once_cell::sync::Lazy;
use secrecy::Secret;
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const TABLE_PATH: &str = "/rest/v1/waitlist_submissions";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        telemetry::init_subscriber(subscriber).expect("Failed to init subscriber");
    } else {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        telemetry::init_subscriber(subscriber).expect("Failed to init subscriber");
    }
});

pub struct TestApp {
    pub mock_store: MockServer,
    pub store: Arc<dyn SubmissionStore>,
    pub controller: FormController,
}

/// Spin up a mock store and wire a controller against it, the way
/// `startup::build_store` would against the hosted endpoint.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let mock_store = MockServer::start().await;
    let store: Arc<dyn SubmissionStore> = Arc::new(RemoteStore::new(
        mock_store.uri(),
        Secret::new("test-api-key".into()),
        "waitlist_submissions".into(),
        Duration::from_secs(5),
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
        },
    ));
    let controller = FormController::new(
        Arc::clone(&store),
        ControllerConfig {
            validate_on_change: true,
            // Parked far in the future so the probe never races the
            // assertions below; the probe has its own unit coverage.
            email_check_debounce: Duration::from_secs(30),
            auto_reset_after: None,
            ..Default::default()
        },
        "landing-page",
    );
    TestApp {
        mock_store,
        store,
        controller,
    }
}

pub fn record_body() -> serde_json::Value {
    serde_json::json!([{
        "id": "2b0a4c9e-7d10-4aa4-b45c-6e55e4b08a0f",
        "name": "John Doe",
        "email": "john@ex.com",
        "subscribed_newsletter": true,
        "source": "landing-page",
        "submitted_at": "2026-08-07T12:00:00+00:00"
    }])
}
