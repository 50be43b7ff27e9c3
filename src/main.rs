use course_waitlist::configuration;
use course_waitlist::startup;
use course_waitlist::telemetry;

/// Small ops tool: report the waitlist's aggregate numbers through the
/// structured logs.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber =
        telemetry::get_subscriber("course-waitlist".into(), "info".into(), std::io::stdout);
    telemetry::init_subscriber(subscriber)?;

    let config = configuration::get_configuration()?;
    let store = startup::build_store(&config);

    let stats = store.stats().await?;
    tracing::info!(
        total = stats.total,
        newsletter_subscribers = stats.newsletter_subscribers,
        this_month = stats.this_month,
        "Waitlist status"
    );
    for (source, count) in &stats.source_breakdown {
        tracing::info!(source = %source, count, "Signups by source");
    }

    Ok(())
}
