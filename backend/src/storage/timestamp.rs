//! Timestamp normalization for values coming out of the tables and the event
//! log. Integers (or digit-only strings) are Unix seconds; anything else must
//! be an ISO-8601 date or date-time. Values without an offset are taken as UTC.

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a textual timestamp given as Unix seconds or ISO-8601
pub fn parse_unix_or_date(raw: &str) -> Result<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(anyhow!("Empty timestamp"));
    }

    if value.chars().all(|c| c.is_ascii_digit()) {
        let secs: i64 = value.parse()?;
        return from_unix_seconds(secs as f64);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(anyhow!("Unrecognized timestamp: '{}'", raw))
}

/// Parse a timestamp from the JSON event log: a number of Unix seconds or a
/// string accepted by `parse_unix_or_date`
pub fn parse_json_timestamp(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n
                .as_f64()
                .ok_or_else(|| anyhow!("Timestamp out of range: {}", n))?;
            from_unix_seconds(secs)
        }
        Value::String(s) => parse_unix_or_date(s),
        other => Err(anyhow!("Unsupported timestamp value: {}", other)),
    }
}

/// Format a timestamp the way the tables store it
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn from_unix_seconds(secs: f64) -> Result<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(anyhow!("Invalid Unix timestamp: {}", secs));
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999))
        .single()
        .ok_or_else(|| anyhow!("Unix timestamp out of range: {}", secs))
}
