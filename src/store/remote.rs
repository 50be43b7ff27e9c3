use crate::constant::{API_KEY_HEADER, CONTENT_RANGE_HEADER, PREFER_HEADER, RANGE_HEADER};
use crate::domain::{NewSubmission, SubmissionRecord};
use crate::error::StoreError;
use crate::store::client::{current_month_start, CountFilter, SubmissionStore, WaitlistStats};
use crate::store::RetryConfig;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Client for the hosted waitlist store (a PostgREST-style API).
///
/// Holds no mutable state between calls; resilience lives in the retry
/// schedule and every error is translated into `StoreError` before it
/// leaves this type.
#[derive(Debug)]
pub struct RemoteStore {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    table: String,
    retry: RetryConfig,
}

/// Wire shape of a structured error reported by the store.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SourceRow {
    source: String,
}

impl RemoteStore {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        table: String,
        timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        let http_client = Client::builder()
            // timeout is a MUST option for client
            .timeout(timeout)
            .build()
            .unwrap();
        RemoteStore {
            http_client,
            base_url,
            api_key,
            table,
            retry,
        }
    }

    fn table_url(&self) -> Result<Url, StoreError> {
        Url::parse(&self.base_url)
            .and_then(|url| url.join(&format!("/rest/v1/{}", self.table)))
            .map_err(|e| {
                tracing::error!("Failed to build store url: base={}, e={:?}", self.base_url, e);
                StoreError::Configuration(format!("invalid store url: {}", e))
            })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }

    /// Map a non-success response onto the error taxonomy. 5xx stays in
    /// the retryable class; anything with a structured body is translated
    /// by SQLSTATE code.
    async fn translate_error(response: Response) -> StoreError {
        let status = response.status();
        if status.is_server_error() {
            return StoreError::Unavailable(status);
        }
        match response.json::<ApiErrorBody>().await {
            Ok(body) => StoreError::from_sqlstate(&body.code, &body.message),
            Err(_) => StoreError::Unknown(format!("HTTP {} with an unreadable body", status)),
        }
    }

    async fn try_insert(&self, submission: &NewSubmission) -> Result<SubmissionRecord, StoreError> {
        let url = self.table_url()?;
        let response = self
            .request(Method::POST, url)
            .header(PREFER_HEADER, "return=representation")
            .json(submission)
            .send()
            .await
            .map_err(StoreError::Network)?;

        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }

        // `return=representation` answers with a one-element array.
        let mut rows: Vec<SubmissionRecord> = response
            .json()
            .await
            .map_err(|e| StoreError::Unknown(format!("malformed insert response: {}", e)))?;
        rows.pop()
            .ok_or_else(|| StoreError::Unknown("insert returned no representation".into()))
    }
}

#[async_trait]
impl SubmissionStore for RemoteStore {
    #[tracing::instrument(
        name = "Insert waitlist submission",
        skip(self, submission),
        fields(email = %submission.email, source = %submission.source)
    )]
    async fn submit(&self, submission: &NewSubmission) -> Result<SubmissionRecord, StoreError> {
        let mut attempt = 1;
        loop {
            match self.try_insert(submission).await {
                Ok(record) => {
                    tracing::info!(attempt, "Submission stored");
                    return Ok(record);
                }
                Err(error) if error.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_before_retry(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error.message = %error,
                        "Insert failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(attempt, error.message = %error, "Insert failed");
                    return Err(error);
                }
            }
        }
    }

    #[tracing::instrument(name = "Probe waitlist email", skip(self, email))]
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let url = self.table_url()?;
        // Stored emails are sanitized to lowercase, so a lowercased
        // equality probe is a case-insensitive lookup.
        let probe = email.trim().to_lowercase();
        let email_filter = format!("eq.{}", probe);
        let response = self
            .request(Method::GET, url)
            .query(&[
                ("select", "id"),
                ("email", email_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(StoreError::Network)?;

        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::Unknown(format!("malformed probe response: {}", e)))?;
        Ok(!rows.is_empty())
    }

    #[tracing::instrument(name = "Count waitlist submissions", skip(self, filter))]
    async fn count(&self, filter: &CountFilter) -> Result<u64, StoreError> {
        let url = self.table_url()?;
        let mut query: Vec<(&str, String)> = vec![("select", "id".into())];
        if let Some(flag) = filter.subscribed_newsletter {
            query.push(("subscribed_newsletter", format!("eq.{}", flag)));
        }
        if let Some(source) = &filter.source {
            query.push(("source", format!("eq.{}", source)));
        }
        if let Some(from) = filter.submitted_from {
            query.push(("submitted_at", format!("gte.{}", from.to_rfc3339())));
        }
        if let Some(until) = filter.submitted_until {
            query.push(("submitted_at", format!("lte.{}", until.to_rfc3339())));
        }

        let response = self
            .request(Method::GET, url)
            .header(PREFER_HEADER, "count=exact")
            .header(RANGE_HEADER, "0-0")
            .query(&query)
            .send()
            .await
            .map_err(StoreError::Network)?;

        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }
        // The exact total rides on the content-range header: "0-0/42".
        response
            .headers()
            .get(CONTENT_RANGE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.rsplit('/').next())
            .and_then(|total| total.parse::<u64>().ok())
            .ok_or_else(|| StoreError::Unknown("store response missing an exact count".into()))
    }

    #[tracing::instrument(name = "Aggregate waitlist stats", skip(self))]
    async fn stats(&self) -> Result<WaitlistStats, StoreError> {
        let total = self.count(&CountFilter::default()).await?;
        let newsletter_subscribers = self
            .count(&CountFilter {
                subscribed_newsletter: Some(true),
                ..Default::default()
            })
            .await?;
        let this_month = self
            .count(&CountFilter {
                submitted_from: Some(current_month_start()),
                ..Default::default()
            })
            .await?;

        // The store exposes no group-by without an RPC; fetch the single
        // column and fold client-side.
        let url = self.table_url()?;
        let response = self
            .request(Method::GET, url)
            .query(&[("select", "source")])
            .send()
            .await
            .map_err(StoreError::Network)?;
        if !response.status().is_success() {
            return Err(Self::translate_error(response).await);
        }
        let rows: Vec<SourceRow> = response
            .json()
            .await
            .map_err(|e| StoreError::Unknown(format!("malformed stats response: {}", e)))?;

        let mut source_breakdown = BTreeMap::new();
        for row in rows {
            *source_breakdown.entry(row.source).or_insert(0) += 1;
        }
        Ok(WaitlistStats {
            total,
            newsletter_subscribers,
            this_month,
            source_breakdown,
        })
    }
}
