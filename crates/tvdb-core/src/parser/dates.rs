//! Premiere date parser
//!
//! Air dates arrive as free text. Anything that is not a recognizable
//! calendar date yields `None`; a missing date is not an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date-time layouts without offset, read as UTC.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Plain date layouts, read as midnight UTC.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse an air date string.
///
/// # Examples
/// ```
/// use chrono::Datelike;
/// use tvdb_core::parser::parse_premiere_date;
///
/// let date = parse_premiere_date("2008-01-20").unwrap();
/// assert_eq!(date.year(), 2008);
/// assert!(parse_premiere_date("").is_none());
/// assert!(parse_premiere_date("0000-00-00").is_none());
/// ```
pub fn parse_premiere_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(date.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc());
        }
    }

    None
}
