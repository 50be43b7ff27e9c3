use crate::domain::{NewSubmission, SubmissionRecord};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local, TimeZone};
use std::collections::BTreeMap;

/// Restricts which submissions a `count` considers. Restrictions are
/// conjunctive; date bounds are inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct CountFilter {
    pub subscribed_newsletter: Option<bool>,
    pub source: Option<String>,
    pub submitted_from: Option<DateTime<Local>>,
    pub submitted_until: Option<DateTime<Local>>,
}

/// Aggregate numbers for the whole waitlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistStats {
    pub total: u64,
    pub newsletter_subscribers: u64,
    /// Submissions since the first instant of the current calendar month,
    /// local time.
    pub this_month: u64,
    pub source_breakdown: BTreeMap<String, u64>,
}

/// Client operations against the waitlist store.
///
/// Two implementations exist, selected once at startup: `RemoteStore` for
/// the hosted API and `StubStore` when no endpoint is configured. The
/// trait also lets tests substitute recording doubles for the controller.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a submission, retrying transient failures. A uniqueness
    /// violation is terminal: it reports an email that is already on the
    /// waitlist, and repeating the insert cannot change that.
    async fn submit(&self, submission: &NewSubmission) -> Result<SubmissionRecord, StoreError>;

    /// Case-insensitive probe for an email already on the waitlist.
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Exact number of submissions matching the filter.
    async fn count(&self, filter: &CountFilter) -> Result<u64, StoreError>;

    /// Aggregate counts over the whole waitlist.
    async fn stats(&self) -> Result<WaitlistStats, StoreError>;
}

/// The first instant of the current calendar month, local time.
pub(crate) fn current_month_start() -> DateTime<Local> {
    let now = Local::now();
    Local
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .earliest()
        .unwrap_or(now)
}
