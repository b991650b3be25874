//! # JSON Event Log Repository
//!
//! Loads allowance schedule events from a JSON array. Each event may be
//! nested or already flattened:
//!
//! ```json
//! [
//!   {"user": {"id": "u1"}, "event": {"timestamp": 1733184000},
//!    "allowance": {"scheduled": {"frequency": "monthly", "day": "15th"}}},
//!   {"user.id": "u2", "event.timestamp": "2024-12-01T09:00:00Z",
//!    "allowance.scheduled.frequency": "weekly", "allowance.scheduled.day": "friday"}
//! ]
//! ```
//!
//! Events whose timestamp cannot be parsed are skipped with a warning. A
//! missing frequency or day is read as empty. A missing user id fails the load.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;
use tracing::{info, warn};

use super::connection::CsvConnection;
use crate::domain::models::AllowanceEvent;
use crate::storage::timestamp::parse_json_timestamp;
use crate::storage::traits::EventLogStorage;

#[derive(Clone)]
pub struct EventLogRepository {
    connection: CsvConnection,
}

impl EventLogRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl EventLogStorage for EventLogRepository {
    fn load_events(&self) -> Result<Vec<AllowanceEvent>> {
        let path = self.connection.events_path();
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let events = parse_event_log(&content).with_context(|| format!("Invalid event log {:?}", path))?;
        info!("Loaded {} allowance events from {:?}", events.len(), path);
        Ok(events)
    }
}

/// Parse the JSON text of an event log
pub fn parse_event_log(content: &str) -> Result<Vec<AllowanceEvent>> {
    let value: Value = serde_json::from_str(content)?;
    let entries = value
        .as_array()
        .ok_or_else(|| anyhow!("Event log must be a JSON array"))?;

    let mut events = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let user_id = field_text(entry, "user.id")
            .ok_or_else(|| anyhow!("Event {} has no user.id", index))?;

        let timestamp = match field(entry, "event.timestamp").map(parse_json_timestamp) {
            Some(Ok(ts)) => ts,
            Some(Err(e)) => {
                warn!("Skipping event {} for user {}: {}", index, user_id, e);
                continue;
            }
            None => {
                warn!("Skipping event {} for user {}: no event.timestamp", index, user_id);
                continue;
            }
        };

        // an empty schedule fails for this user only, when it is normalized
        let frequency = field_text(entry, "allowance.scheduled.frequency").unwrap_or_default();
        let raw_day = field_text(entry, "allowance.scheduled.day").unwrap_or_default();

        events.push(AllowanceEvent {
            user_id,
            timestamp,
            frequency,
            raw_day,
        });
    }

    Ok(events)
}

/// Look up a dotted path either as a flat key or through nested objects
fn field<'a>(entry: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = entry.get(path) {
        return Some(value);
    }
    path.split('.')
        .try_fold(entry, |current, segment| current.get(segment))
}

/// Field value as text; numbers are accepted, null is treated as absent
fn field_text(entry: &Value, path: &str) -> Option<String> {
    match field(entry, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ScheduleError;
    use crate::domain::reconciliation_service::reconcile;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_parse_nested_and_flat_events() {
        let content = r#"[
            {"user": {"id": "u1"}, "event": {"timestamp": 1733184000},
             "allowance": {"scheduled": {"frequency": "monthly", "day": "15th"}}},
            {"user.id": 42, "event.timestamp": "2024-12-01T09:00:00Z",
             "allowance.scheduled.frequency": "Weekly", "allowance.scheduled.day": "Friday"}
        ]"#;

        let events = parse_event_log(content).unwrap();

        assert_eq!(
            events,
            vec![
                AllowanceEvent {
                    user_id: "u1".to_string(),
                    timestamp: Utc.with_ymd_and_hms(2024, 12, 3, 0, 0, 0).unwrap(),
                    frequency: "monthly".to_string(),
                    raw_day: "15th".to_string(),
                },
                AllowanceEvent {
                    user_id: "42".to_string(),
                    timestamp: Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap(),
                    frequency: "Weekly".to_string(),
                    raw_day: "Friday".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_skipped() {
        let content = r#"[
            {"user": {"id": "u1"}, "event": {"timestamp": "not a date"},
             "allowance": {"scheduled": {"frequency": "daily", "day": "daily"}}},
            {"user": {"id": "u2"}, "event": {"timestamp": "1733184000"},
             "allowance": {"scheduled": {"frequency": "daily", "day": "daily"}}}
        ]"#;
        let events = parse_event_log(content).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id, "u2");
    }

    #[test]
    fn test_missing_user_is_an_error() {
        let content = r#"[{"event": {"timestamp": 1}, "allowance": {"scheduled": {"frequency": "daily"}}}]"#;
        assert!(parse_event_log(content).is_err());
        assert!(parse_event_log(r#"{"user": {"id": "u1"}}"#).is_err());
    }

    #[test]
    fn test_missing_day_defaults_to_empty() {
        let content = r#"[{"user": {"id": "u1"}, "event": {"timestamp": 1},
                          "allowance": {"scheduled": {"frequency": "daily", "day": null}}}]"#;
        let events = parse_event_log(content).unwrap();
        assert_eq!(events[0].raw_day, "");
    }

    #[test]
    fn test_missing_frequency_only_fails_that_user() {
        let content = r#"[
            {"user": {"id": "good"}, "event": {"timestamp": 1733184000},
             "allowance": {"scheduled": {"frequency": "monthly", "day": "15th"}}},
            {"user": {"id": "no-frequency"}, "event": {"timestamp": 1733184000},
             "allowance": {"scheduled": {"frequency": null, "day": "15th"}}},
            {"user": {"id": "no-schedule"}, "event": {"timestamp": 1733184000}}
        ]"#;

        let events = parse_event_log(content).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].frequency, "");
        assert_eq!(events[2].frequency, "");

        let reference = NaiveDate::from_ymd_opt(2024, 12, 3).unwrap();
        let updates = reconcile(&events, reference);
        assert_eq!(
            updates["good"].next_payment,
            Ok(NaiveDate::from_ymd_opt(2024, 12, 15).unwrap())
        );
        assert_eq!(
            updates["no-frequency"].failure(),
            Some(&ScheduleError::UnrecognizedSchedule {
                frequency: String::new(),
                day: "15th".to_string(),
            })
        );
        assert!(matches!(
            updates["no-schedule"].failure(),
            Some(ScheduleError::UnrecognizedSchedule { .. })
        ));
    }

    #[test]
    fn test_repository_reads_events_file() {
        let temp_dir = TempDir::new().unwrap();
        let conn = CsvConnection::new(temp_dir.path());
        fs::write(
            conn.events_path(),
            r#"[{"user": {"id": "u1"}, "event": {"timestamp": 1733184000},
                 "allowance": {"scheduled": {"frequency": "monthly", "day": "1st"}}}]"#,
        )
        .unwrap();

        let events = EventLogRepository::new(conn).load_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].raw_day, "1st");
    }
}
