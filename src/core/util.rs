//! Small formatting and validation helpers shared by the facade and the UI layer.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Checks that `email` looks like `local@domain.tld`. Not RFC 5322.
#[must_use]
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Renders a stored timestamp as `Oct 19, 2026, 03:45 PM` in local time.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (read as UTC
/// midnight). Anything else renders as `Invalid Date`.
#[must_use]
pub fn format_date(date_string: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(date_string.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date_string.trim(), "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        });

    parsed.map_or_else(
        || "Invalid Date".to_string(),
        |utc| {
            utc.with_timezone(&Local)
                .format("%b %-d, %Y, %I:%M %p")
                .to_string()
        },
    )
}

/// Current time as an ISO-8601 string with millisecond precision.
#[must_use]
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current local time in the activity log's display format.
#[must_use]
pub fn now_display() -> String {
    Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("student@example.com"));
        assert!(validate_email("a.b+c@school.co.uk"));
        assert!(!validate_email("no-at-sign.com"));
        assert!(!validate_email("two@@example.com"));
        assert!(!validate_email("missing@tld"));
        assert!(!validate_email("spaces in@example.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_format_date_matches_local_rendering() {
        let input = "2026-03-05T14:07:00.000Z";
        let expected = DateTime::parse_from_rfc3339(input)
            .map(|dt| dt.with_timezone(&Local).format("%b %-d, %Y, %I:%M %p").to_string())
            .unwrap_or_default();

        let formatted = format_date(input);
        assert_eq!(formatted, expected);
        assert!(formatted.contains("2026"));
    }

    #[test]
    fn test_format_date_accepts_plain_dates() {
        assert_ne!(format_date("2026-01-15"), "Invalid Date");
    }

    #[test]
    fn test_format_date_invalid_input() {
        assert_eq!(format_date("yesterday"), "Invalid Date");
        assert_eq!(format_date(""), "Invalid Date");
    }

    #[test]
    fn test_now_iso_is_rfc3339() {
        assert!(DateTime::parse_from_rfc3339(&now_iso()).is_ok());
    }
}
