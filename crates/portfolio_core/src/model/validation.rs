//! Field validation errors shared by company and update records.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

/// Validation failure raised before any store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    MissingField(&'static str),
    /// Contact email is present but malformed.
    InvalidEmail(String),
    /// Data warehouse link is present but not an absolute http(s) URL.
    InvalidLink(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is empty"),
            Self::InvalidEmail(value) => write!(f, "invalid contact email `{value}`"),
            Self::InvalidLink(value) => {
                write!(f, "invalid data warehouse link `{value}`; expected http(s) URL")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Empty email is allowed; non-empty must look like `local@domain`.
pub(crate) fn check_email(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || EMAIL_RE.is_match(trimmed) {
        return Ok(());
    }
    Err(ValidationError::InvalidEmail(trimmed.to_string()))
}

pub(crate) fn check_link(value: Option<&str>) -> Result<(), ValidationError> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(());
    };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::InvalidLink(raw.to_string())),
    }
}
