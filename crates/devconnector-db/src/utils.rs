//! Shared utility functions

use chrono::{DateTime, NaiveDate, Utc};

/// Storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalize an email address for storage and lookup
///
/// Emails are compared case-insensitively, so every write and every lookup
/// goes through this function.
///
/// # Examples
///
/// ```
/// use devconnector_db::utils::normalize_email;
///
/// assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Parse a calendar date given either as `YYYY-MM-DD` or as an RFC3339 timestamp
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

/// Decode a stored RFC3339 timestamp column
pub(crate) fn decode_datetime(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Decode a stored date column
pub(crate) fn decode_date(s: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_datetime() {
        let parsed = decode_datetime("2024-01-01T12:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        assert!(matches!(decode_datetime("invalid"), Err(sqlx::Error::Decode(_))));
        assert!(decode_datetime("").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("A@X.com"), "a@x.com");
        assert_eq!(normalize_email(" a@x.com\n"), "a@x.com");
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        assert_eq!(parse_date("2019-06-01"), Some(expected));
        assert_eq!(parse_date("2019-06-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_date(" 2019-06-01 "), Some(expected));
        assert_eq!(parse_date("June 2019"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_decode_date_rejects_garbage() {
        assert!(decode_date("2020-02-30").is_err());
        assert!(decode_date("2020-02-29").is_ok());
    }
}
