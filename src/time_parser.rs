//! Time string parsing for tool time-range parameters.
//!
//! Supports three formats, checked in order: absolute Unix timestamps
//! (10+ digits), relative offsets (`1h`, `30m`, `7d`, `2w`), and
//! RFC 3339 / ISO 8601 timestamps.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::datadog::error::DatadogError;

/// Current time as Unix epoch seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Parse a time string to Unix epoch seconds.
pub fn parse_time(value: &str) -> Result<i64, DatadogError> {
    parse_time_at(value, now_unix())
}

/// Parse a from/to pair into Unix epoch seconds. `to` defaults to now.
pub fn parse_time_range(from: &str, to: Option<&str>) -> Result<(i64, i64), DatadogError> {
    let from_ts = parse_time(from)?;
    let to_ts = match to {
        Some(t) => parse_time(t)?,
        None => now_unix(),
    };
    Ok((from_ts, to_ts))
}

/// `parse_time` against an explicit "now", so relative offsets are
/// deterministic under test.
pub(crate) fn parse_time_at(value: &str, now: i64) -> Result<i64, DatadogError> {
    // Absolute Unix timestamp (10+ digits)
    if value.len() >= 10 && value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<i64>()
            .map_err(|_| DatadogError::TimeParse(value.to_string()));
    }

    // Relative offset, subtracted from now
    if let Some(ts) = parse_relative(value, now) {
        return Ok(ts);
    }

    // RFC 3339 / ISO 8601; a naive timestamp is taken as UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc().timestamp());
    }

    Err(DatadogError::TimeParse(value.to_string()))
}

fn unit_seconds(unit: char) -> Option<i64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3600),
        'd' => Some(86400),
        'w' => Some(604800),
        _ => None,
    }
}

fn parse_relative(value: &str, now: i64) -> Option<i64> {
    let unit = value.chars().last()?;
    let seconds = unit_seconds(unit)?;
    let amount_str = &value[..value.len() - unit.len_utf8()];
    if amount_str.is_empty() || !amount_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: i64 = amount_str.parse().ok()?;
    Some(now - amount * seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn relative_seconds() {
        assert_eq!(parse_time_at("120s", NOW).unwrap(), NOW - 120);
    }

    #[test]
    fn relative_minutes() {
        assert_eq!(parse_time_at("30m", NOW).unwrap(), NOW - 30 * 60);
    }

    #[test]
    fn relative_hours() {
        assert_eq!(parse_time_at("1h", NOW).unwrap(), NOW - 3600);
    }

    #[test]
    fn relative_days() {
        assert_eq!(parse_time_at("7d", NOW).unwrap(), NOW - 7 * 86400);
    }

    #[test]
    fn relative_weeks() {
        assert_eq!(parse_time_at("2w", NOW).unwrap(), NOW - 2 * 604800);
    }

    #[test]
    fn unix_timestamp() {
        assert_eq!(parse_time_at("1700000000", NOW).unwrap(), 1_700_000_000);
    }

    #[test]
    fn long_unix_timestamp() {
        assert_eq!(parse_time_at("17000000000", NOW).unwrap(), 17_000_000_000);
    }

    #[test]
    fn short_digit_string_is_not_absolute() {
        // Nine digits: not a Unix timestamp, not relative, not RFC 3339.
        assert!(parse_time_at("123456789", NOW).is_err());
    }

    #[test]
    fn iso8601_utc() {
        let ts = parse_time_at("2024-01-15T10:30:00Z", NOW).unwrap();
        assert_eq!(ts, 1_705_314_600);
    }

    #[test]
    fn iso8601_offset() {
        let ts = parse_time_at("2024-01-15T10:30:00+00:00", NOW).unwrap();
        assert_eq!(ts, 1_705_314_600);
    }

    #[test]
    fn iso8601_naive_is_utc() {
        let ts = parse_time_at("2024-01-15T10:30:00", NOW).unwrap();
        assert_eq!(ts, 1_705_314_600);
    }

    #[test]
    fn garbage_string_fails() {
        let err = parse_time_at("not-a-time", NOW).unwrap_err();
        assert!(err.to_string().contains("'not-a-time'"));
    }

    #[test]
    fn empty_string_fails() {
        assert!(parse_time_at("", NOW).is_err());
    }

    #[test]
    fn partial_relative_fails() {
        let err = parse_time_at("1x", NOW).unwrap_err();
        assert!(err.to_string().contains("Invalid time"));
    }

    #[test]
    fn unit_without_amount_fails() {
        assert!(parse_time_at("h", NOW).is_err());
    }

    #[test]
    fn now_unix_is_positive() {
        assert!(now_unix() > 1_700_000_000);
    }

    #[test]
    fn range_defaults_to_now() {
        let (from, to) = parse_time_range("1700000000", None).unwrap();
        assert_eq!(from, 1_700_000_000);
        assert!(to >= from);
    }
}
