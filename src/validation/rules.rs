use crate::constant::{
    COMPANY_MAX_LENGTH, COMPANY_MIN_LENGTH, EMAIL_MAX_LENGTH, EMAIL_MIN_LENGTH,
    MESSAGE_MAX_LENGTH, MESSAGE_MIN_LENGTH, NAME_MAX_LENGTH, NAME_MIN_LENGTH,
};
use crate::domain::{FormData, FormField};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s'-]+$").expect("name pattern is valid"));
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern is valid"));

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RequiredField,
    TooShort,
    TooLong,
    InvalidPattern,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RequiredField => "REQUIRED_FIELD",
            ErrorCode::TooShort => "TOO_SHORT",
            ErrorCode::TooLong => "TOO_LONG",
            ErrorCode::InvalidPattern => "INVALID_PATTERN",
        }
    }
}

/// A single field's validation failure. A form holds at most one of these
/// per field at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: FormField,
    pub code: ErrorCode,
    pub message: String,
}

/// The outcome of sweeping every field of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

struct FieldRule {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<&'static Lazy<Regex>>,
    pattern_message: &'static str,
}

/// The newsletter checkbox has no rule: it is always valid.
fn rule_for(field: FormField) -> Option<FieldRule> {
    match field {
        FormField::Name => Some(FieldRule {
            min_length: Some(NAME_MIN_LENGTH),
            max_length: Some(NAME_MAX_LENGTH),
            pattern: Some(&NAME_PATTERN),
            pattern_message: "Name may only contain letters, spaces, hyphens and apostrophes.",
        }),
        FormField::Email => Some(FieldRule {
            min_length: Some(EMAIL_MIN_LENGTH),
            max_length: Some(EMAIL_MAX_LENGTH),
            pattern: Some(&EMAIL_PATTERN),
            pattern_message: "Email must be a valid email address.",
        }),
        FormField::Message => Some(FieldRule {
            min_length: Some(MESSAGE_MIN_LENGTH),
            max_length: Some(MESSAGE_MAX_LENGTH),
            pattern: None,
            pattern_message: "",
        }),
        FormField::Company => Some(FieldRule {
            min_length: Some(COMPANY_MIN_LENGTH),
            max_length: Some(COMPANY_MAX_LENGTH),
            pattern: None,
            pattern_message: "",
        }),
        FormField::Phone => Some(FieldRule {
            min_length: None,
            max_length: None,
            pattern: Some(&PHONE_PATTERN),
            pattern_message: "Phone must be digits only, with an optional leading +.",
        }),
        FormField::SubscribedNewsletter => None,
    }
}

fn label(field: FormField) -> &'static str {
    match field {
        FormField::Name => "Name",
        FormField::Email => "Email",
        FormField::Message => "Message",
        FormField::Company => "Company",
        FormField::Phone => "Phone",
        FormField::SubscribedNewsletter => "Newsletter",
    }
}

fn error(field: FormField, code: ErrorCode, message: String) -> ValidationError {
    ValidationError {
        field,
        code,
        message,
    }
}

/// Validate a single field against its rule.
///
/// A required field that is absent or blank yields a `REQUIRED_FIELD`
/// error; an optional one is simply valid. Otherwise the checks run in a
/// fixed order (minimum length, maximum length, pattern) and the first
/// violation wins. Never panics: there is no input for which this is an
/// error rather than a result.
pub fn validate_field(field: FormField, value: Option<&str>) -> Option<ValidationError> {
    let rule = rule_for(field)?;
    let trimmed = value.unwrap_or("").trim();

    if trimmed.is_empty() {
        if field.is_required() {
            return Some(error(
                field,
                ErrorCode::RequiredField,
                format!("{} is required.", label(field)),
            ));
        }
        return None;
    }

    // Length limits count user-perceived characters, not bytes.
    let length = trimmed.graphemes(true).count();
    if let Some(min) = rule.min_length {
        if length < min {
            return Some(error(
                field,
                ErrorCode::TooShort,
                format!("{} must be at least {} characters.", label(field), min),
            ));
        }
    }
    if let Some(max) = rule.max_length {
        if length > max {
            return Some(error(
                field,
                ErrorCode::TooLong,
                format!("{} must be at most {} characters.", label(field), max),
            ));
        }
    }
    if let Some(pattern) = rule.pattern {
        if !pattern.is_match(trimmed) {
            return Some(error(
                field,
                ErrorCode::InvalidPattern,
                rule.pattern_message.to_string(),
            ));
        }
    }
    None
}

/// Sweep every field without short-circuiting, aggregating errors in
/// field-declaration order.
pub fn validate_form(data: &FormData) -> ValidationResult {
    let errors: Vec<ValidationError> = FormField::TEXT_FIELDS
        .iter()
        .filter_map(|&field| validate_field(field, data.text(field)))
        .collect();
    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}
