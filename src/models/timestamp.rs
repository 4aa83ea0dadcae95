//! Lenient timestamp parsing for backend payloads.
//!
//! The backend emits naive UTC date-times (no offset) for most columns, while
//! other deployments send RFC 3339. Both are accepted here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an RFC 3339 or naive ISO date-time. Naive values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a due date given as a plain date or as any accepted date-time.
/// Only the date part is kept.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|dt| dt.date_naive()))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
        None => Ok(None),
    }
}

pub fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_due_date(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid due date: {raw}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_naive_timestamp_is_utc() {
        let dt = parse_timestamp("2026-02-05T21:53:10.123456").unwrap();
        assert_eq!(dt.hour(), 21);
        assert_eq!(dt.second(), 10);
    }

    #[test]
    fn test_rfc3339_offset_is_normalized() {
        let dt = parse_timestamp("2026-02-05T23:53:00+02:00").unwrap();
        assert_eq!(dt.hour(), 21);
    }

    #[test]
    fn test_due_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 21).unwrap();
        assert_eq!(parse_due_date("2026-02-21"), Some(expected));
        assert_eq!(parse_due_date("2026-02-21T15:30"), Some(expected));
        assert_eq!(parse_due_date("2026-02-21 15:30:00"), Some(expected));
        assert_eq!(parse_due_date("2026-02-21T15:30:00Z").map(|d| d.day()), Some(21));
        assert_eq!(parse_due_date("next tuesday"), None);
    }
}
