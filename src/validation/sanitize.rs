use crate::domain::FormData;
use crate::validation::{validate_form, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A sanitized form together with the validation verdict on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedForm {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub data: FormData,
}

/// Strip HTML-like tags, collapse whitespace runs to single spaces and
/// trim the ends.
fn clean_text(raw: &str) -> String {
    let stripped = TAG_PATTERN.replace_all(raw, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Upper-case the first letter of each word, lower-case the rest.
fn title_case(cleaned: &str) -> String {
    cleaned
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    let cleaned = clean_text(value?);
    if cleaned.is_empty() {
        // An optional field that sanitizes down to nothing was never
        // really filled in.
        None
    } else {
        Some(cleaned)
    }
}

/// Normalize raw form input. Idempotent: sanitizing a sanitized form is a
/// no-op.
pub fn sanitize(data: &FormData) -> FormData {
    FormData {
        name: title_case(&clean_text(&data.name)),
        email: data.email.trim().to_lowercase(),
        subscribed_newsletter: data.subscribed_newsletter,
        message: clean_optional(data.message.as_deref()),
        company: clean_optional(data.company.as_deref()),
        phone: clean_optional(data.phone.as_deref()),
    }
}

/// Sanitize first, then validate the sanitized output, so that surrounding
/// whitespace or markup never shows up as a length failure.
pub fn validate_and_sanitize(data: &FormData) -> SanitizedForm {
    let data = sanitize(data);
    let result = validate_form(&data);
    SanitizedForm {
        is_valid: result.is_valid,
        errors: result.errors,
        data,
    }
}
