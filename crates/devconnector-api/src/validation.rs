//! Request field validation
//!
//! Handlers run every check for a request and report all failing fields
//! at once.

use chrono::NaiveDate;
use devconnector_db::utils::parse_date;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ApiError, FieldError};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Check an email address for a plausible `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Treat blank strings as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accumulates field errors for one request
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless `ok` holds
    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// The field must be present and not blank
    pub fn required(&mut self, field: &str, value: Option<&str>, message: &str) -> &mut Self {
        let present = value.is_some_and(|v| !v.trim().is_empty());
        self.check(field, present, message)
    }

    /// The field must be a valid email address
    pub fn email(&mut self, field: &str, value: Option<&str>, message: &str) -> &mut Self {
        self.check(field, value.is_some_and(is_valid_email), message)
    }

    /// The field must have between `min` and `max` characters
    pub fn length(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
        message: &str,
    ) -> &mut Self {
        let ok = value.is_some_and(|v| (min..=max).contains(&v.chars().count()));
        self.check(field, ok, message)
    }

    /// Parse an optional date field, recording an error if it is present but malformed
    pub fn date(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<NaiveDate> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = parse_date(value);
        self.check(field, parsed.is_some(), message);
        parsed
    }

    /// Whether no field has failed so far
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finish validation, failing with every recorded field error
    pub fn finish(self) -> Result<(), ApiError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}
