use crate::constant::{
    FOREIGN_KEY_VIOLATION, INSUFFICIENT_PRIVILEGE, NOT_NULL_VIOLATION, UNDEFINED_TABLE,
    UNIQUE_VIOLATION,
};
use reqwest::StatusCode;
use std::fmt::{Debug, Formatter};

/// Everything the submission store can fail with, translated from the
/// hosted API's SQLSTATE vocabulary at the transport boundary. No raw
/// transport error crosses this type.
#[derive(thiserror::Error)]
pub enum StoreError {
    // TRANSLATED FROM THE STORE'S STRUCTURED ERRORS
    #[error("A submission with this email address already exists.")]
    DuplicateEmail,

    #[error("The store rejected the submission: a required column was empty.")]
    MissingRequiredField,

    #[error("The submission referenced a row that does not exist.")]
    ReferentialViolation,

    #[error("The store is not correctly provisioned: {0}")]
    Configuration(String),

    #[error("The store refused the request: insufficient privileges.")]
    PermissionDenied,

    // TRANSPORT
    #[error("Failed to reach the submission store.")]
    Network(#[source] reqwest::Error),

    #[error("The submission store is unavailable (HTTP {0}).")]
    Unavailable(StatusCode),

    // FALLBACK
    #[error("The submission store returned an unexpected error: {0}")]
    Unknown(String),
}

impl StoreError {
    /// Transport-class failures may succeed on a later attempt; translated
    /// SQLSTATE errors never will.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Network(_) | StoreError::Unavailable(_))
    }

    /// Translate a SQLSTATE code reported by the hosted store.
    pub fn from_sqlstate(code: &str, message: &str) -> Self {
        match code {
            UNIQUE_VIOLATION => StoreError::DuplicateEmail,
            NOT_NULL_VIOLATION => StoreError::MissingRequiredField,
            FOREIGN_KEY_VIOLATION => StoreError::ReferentialViolation,
            UNDEFINED_TABLE => {
                StoreError::Configuration("the waitlist table does not exist".into())
            }
            INSUFFICIENT_PRIVILEGE => StoreError::PermissionDenied,
            _ => StoreError::Unknown(format!("{}: {}", code, message)),
        }
    }
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        crate::error::error_chain_fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use reqwest::StatusCode;

    #[test]
    fn sqlstate_codes_map_onto_the_closed_taxonomy() {
        assert!(matches!(
            StoreError::from_sqlstate("23505", "duplicate key value"),
            StoreError::DuplicateEmail
        ));
        assert!(matches!(
            StoreError::from_sqlstate("23502", "null value in column"),
            StoreError::MissingRequiredField
        ));
        assert!(matches!(
            StoreError::from_sqlstate("23503", "violates foreign key"),
            StoreError::ReferentialViolation
        ));
        assert!(matches!(
            StoreError::from_sqlstate("42P01", "relation does not exist"),
            StoreError::Configuration(_)
        ));
        assert!(matches!(
            StoreError::from_sqlstate("42501", "permission denied"),
            StoreError::PermissionDenied
        ));
    }

    #[test]
    fn unknown_codes_keep_the_original_message() {
        let error = StoreError::from_sqlstate("XX000", "internal error");
        match error {
            StoreError::Unknown(message) => assert!(message.contains("internal error")),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(StoreError::Unavailable(StatusCode::INTERNAL_SERVER_ERROR).is_retryable());
        assert!(!StoreError::DuplicateEmail.is_retryable());
        assert!(!StoreError::PermissionDenied.is_retryable());
        assert!(!StoreError::Unknown("boom".into()).is_retryable());
    }
}
