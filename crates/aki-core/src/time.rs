//! Timestamp parsing and hourly bucketing.
//!
//! Timestamps are carried as naive UTC epoch milliseconds throughout the
//! pipeline; hourly grids are built by flooring to the hour.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const MILLIS_PER_HOUR: i64 = 3_600_000;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a raw timestamp cell into epoch milliseconds.
///
/// Integers are taken as epoch milliseconds. Returns None for text that
/// matches no supported layout.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(millis) = trimmed.parse::<i64>() {
        return Some(millis);
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc).timestamp_millis());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc().timestamp_millis())
}

/// Start of the hour containing `millis`.
pub fn floor_hour(millis: i64) -> i64 {
    millis.div_euclid(MILLIS_PER_HOUR) * MILLIS_PER_HOUR
}

/// Formats epoch milliseconds as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
