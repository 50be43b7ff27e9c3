use crate::domain::FormData;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sanitized payload ready to be inserted into the store.
///
/// Callers are expected to hand in data that already passed
/// `validate_and_sanitize`; the submission timestamp is stamped here.
#[derive(Debug, Clone, Serialize)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub subscribed_newsletter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Which UI placement produced this submission.
    pub source: String,
    pub submitted_at: DateTime<Local>,
}

impl NewSubmission {
    pub fn from_form(data: FormData, source: impl Into<String>) -> Self {
        Self {
            name: data.name,
            email: data.email,
            subscribed_newsletter: data.subscribed_newsletter,
            message: data.message,
            company: data.company,
            phone: data.phone,
            source: source.into(),
            submitted_at: Local::now(),
        }
    }
}

/// A row created by the store. Assigned its id server-side and never
/// mutated client-side; the email column is unique across rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subscribed_newsletter: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub source: String,
    pub submitted_at: DateTime<Local>,
}
