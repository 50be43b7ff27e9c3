use crate::domain::{NewSubmission, SubmissionRecord};
use crate::error::StoreError;
use crate::store::client::{current_month_start, CountFilter, SubmissionStore, WaitlistStats};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory stand-in used when no store endpoint is configured.
///
/// A local-development fallback, not a production contract: results are
/// deterministic (counter-derived ids) and nothing is persisted. The email
/// uniqueness rule is mirrored here so the duplicate path behaves the same
/// as against the hosted store.
pub struct StubStore {
    state: Mutex<StubState>,
}

#[derive(Default)]
struct StubState {
    rows: Vec<SubmissionRecord>,
    next_id: u64,
}

impl StubStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState::default()),
        }
    }

    fn matches(filter: &CountFilter, record: &SubmissionRecord) -> bool {
        if let Some(flag) = filter.subscribed_newsletter {
            if record.subscribed_newsletter != flag {
                return false;
            }
        }
        if let Some(source) = &filter.source {
            if &record.source != source {
                return false;
            }
        }
        if let Some(from) = filter.submitted_from {
            if record.submitted_at < from {
                return false;
            }
        }
        if let Some(until) = filter.submitted_until {
            if record.submitted_at > until {
                return false;
            }
        }
        true
    }
}

impl Default for StubStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionStore for StubStore {
    async fn submit(&self, submission: &NewSubmission) -> Result<SubmissionRecord, StoreError> {
        let mut state = self.state.lock().expect("stub store lock poisoned");
        if state
            .rows
            .iter()
            .any(|row| row.email.eq_ignore_ascii_case(&submission.email))
        {
            return Err(StoreError::DuplicateEmail);
        }
        let record = SubmissionRecord {
            id: Uuid::from_u128(state.next_id as u128),
            name: submission.name.clone(),
            email: submission.email.clone(),
            subscribed_newsletter: submission.subscribed_newsletter,
            message: submission.message.clone(),
            company: submission.company.clone(),
            phone: submission.phone.clone(),
            source: submission.source.clone(),
            submitted_at: submission.submitted_at,
        };
        state.next_id += 1;
        state.rows.push(record.clone());
        Ok(record)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().expect("stub store lock poisoned");
        let probe = email.trim();
        Ok(state
            .rows
            .iter()
            .any(|row| row.email.eq_ignore_ascii_case(probe)))
    }

    async fn count(&self, filter: &CountFilter) -> Result<u64, StoreError> {
        let state = self.state.lock().expect("stub store lock poisoned");
        Ok(state
            .rows
            .iter()
            .filter(|row| Self::matches(filter, row))
            .count() as u64)
    }

    async fn stats(&self) -> Result<WaitlistStats, StoreError> {
        let state = self.state.lock().expect("stub store lock poisoned");
        let month_start = current_month_start();
        let mut source_breakdown = BTreeMap::new();
        for row in &state.rows {
            *source_breakdown.entry(row.source.clone()).or_insert(0) += 1;
        }
        Ok(WaitlistStats {
            total: state.rows.len() as u64,
            newsletter_subscribers: state
                .rows
                .iter()
                .filter(|row| row.subscribed_newsletter)
                .count() as u64,
            this_month: state
                .rows
                .iter()
                .filter(|row| row.submitted_at >= month_start)
                .count() as u64,
            source_breakdown,
        })
    }
}
