use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

pub const COMPLAINT_ID_PREFIX: &str = "CMP";
pub const DEFAULT_STATUS: &str = "pending";

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum ComplaintError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("complaint not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Create-side input. The generated identifier, `created_at`, and the
/// defaulted status are assigned by the store, never by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct NewComplaint {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub complaint_details: String,
}

/// The read projection of a stored complaint. `status` is write-only from
/// the client's perspective and is absent from every read.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Complaint {
    pub complaint_id: String,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub complaint_details: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[1-9]?[0-9]{7,15}$")
        .unwrap_or_else(|err| panic!("invalid phone pattern: {err}"))
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|err| panic!("invalid email pattern: {err}"))
});

/// Anchored match: optional `+`, optional single digit `1-9`, then 7 to 15
/// digits. A number with no leading significant digit still passes when the
/// trailing run alone satisfies the length bound.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

impl NewComplaint {
    /// Checks required fields and formats before any persistence attempt.
    /// The first failing field wins.
    ///
    /// # Errors
    /// Returns [`ComplaintError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), ComplaintError> {
        if self.name.trim().is_empty() {
            return Err(ComplaintError::Validation(
                "name must not be empty".to_string(),
            ));
        }

        if self.phone_number.is_empty() {
            return Err(ComplaintError::Validation(
                "phone_number must not be empty".to_string(),
            ));
        }

        if !is_valid_phone(&self.phone_number) {
            return Err(ComplaintError::Validation(
                "invalid phone number format".to_string(),
            ));
        }

        if self.email.is_empty() {
            return Err(ComplaintError::Validation(
                "email must not be empty".to_string(),
            ));
        }

        if !is_valid_email(&self.email) {
            return Err(ComplaintError::Validation(
                "invalid email format".to_string(),
            ));
        }

        if self.complaint_details.trim().is_empty() {
            return Err(ComplaintError::Validation(
                "complaint_details must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Produces `CMP` followed by the first 8 characters of a freshly generated
/// v4 UUID's hyphenated rendering, upper-cased. The truncation operates on
/// the rendered string; the first hyphen sits at index 9, so the fragment is
/// hex in practice. No uniqueness probe is made here: a collision surfaces
/// as a primary-key violation at insert time.
#[must_use]
pub fn generate_complaint_id() -> String {
    let rendered = Uuid::new_v4().to_string();
    let fragment: String = rendered.chars().take(8).collect();
    format!("{COMPLAINT_ID_PREFIX}{}", fragment.to_ascii_uppercase())
}

/// Parses an RFC3339 timestamp and requires UTC (`Z`) offset.
///
/// # Errors
/// Returns [`ComplaintError::Validation`] when parsing fails or the input
/// timestamp is not UTC.
pub fn parse_rfc3339_utc(value: &str) -> Result<OffsetDateTime, ComplaintError> {
    let parsed = OffsetDateTime::parse(value, &time::format_description::well_known::Rfc3339)
        .map_err(|err| ComplaintError::Validation(format!("invalid RFC3339 timestamp: {err}")))?;

    if parsed.offset() != UtcOffset::UTC {
        return Err(ComplaintError::Validation(
            "timestamp MUST use UTC offset Z".to_string(),
        ));
    }

    Ok(parsed)
}

/// Formats a timestamp as RFC3339 after normalizing to UTC.
///
/// # Errors
/// Returns [`ComplaintError::Validation`] when formatting fails.
pub fn format_rfc3339(value: OffsetDateTime) -> Result<String, ComplaintError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|err| {
            ComplaintError::Validation(format!("failed to format RFC3339 timestamp: {err}"))
        })
}

#[must_use]
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(UtcOffset::UTC)
}
