//! Applies reconciled updates to the allowance backend table and projects the
//! payment schedule table out of it.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::domain::models::{AllowanceRecord, PaymentScheduleRecord, ReconciledUpdate};

/// Overwrite the schedule fields of every record that has an update.
///
/// The row set and order of `original` are preserved: updates for users that
/// are not in the table are dropped.
pub fn merge(
    original: &[AllowanceRecord],
    updates: &BTreeMap<String, ReconciledUpdate>,
) -> Vec<AllowanceRecord> {
    let mut applied = 0;
    let merged: Vec<AllowanceRecord> = original
        .iter()
        .map(|record| {
            let mut record = record.clone();
            if let Some(update) = updates.get(&record.uuid) {
                record.frequency = update.frequency.clone();
                record.day = update.raw_day.clone();
                record.next_payment_day = update.next_payment_day();
                record.updated_at = update.updated_at;
                applied += 1;
            }
            record
        })
        .collect();

    let known: HashSet<&str> = original.iter().map(|r| r.uuid.as_str()).collect();
    let dropped = updates
        .keys()
        .filter(|uuid| !known.contains(uuid.as_str()))
        .count();
    if dropped > 0 {
        debug!("{} updates had no matching allowance record", dropped);
    }
    info!("Applied {} updates to {} allowance records", applied, merged.len());

    merged
}

/// One payment schedule row per record, optionally only for enabled ones
pub fn project_schedule(records: &[AllowanceRecord], only_enabled: bool) -> Vec<PaymentScheduleRecord> {
    records
        .iter()
        .filter(|record| !only_enabled || record.is_enabled())
        .map(|record| PaymentScheduleRecord {
            uuid: record.uuid.clone(),
            payment_date: record.next_payment_day,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AllowanceEvent, AllowanceStatus, ScheduleError};
    use crate::domain::reconciliation_service::reconcile;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn record(uuid: &str, status: AllowanceStatus, next: Option<u32>) -> AllowanceRecord {
        AllowanceRecord {
            uuid: uuid.to_string(),
            creation_date: ts(100),
            status,
            frequency: "monthly".to_string(),
            day: "1st".to_string(),
            next_payment_day: next,
            updated_at: ts(200),
        }
    }

    fn update(day: u32, updated_at: i64) -> ReconciledUpdate {
        ReconciledUpdate {
            frequency: "weekly".to_string(),
            raw_day: "friday".to_string(),
            next_payment: Ok(NaiveDate::from_ymd_opt(2024, 12, day).unwrap()),
            updated_at: ts(updated_at),
        }
    }

    #[test]
    fn test_merge_overwrites_only_schedule_fields() {
        let original = vec![record("a", AllowanceStatus::Enabled, Some(1))];
        let updates = BTreeMap::from([("a".to_string(), update(6, 900))]);

        let merged = merge(&original, &updates);

        assert_eq!(merged.len(), 1);
        let row = &merged[0];
        assert_eq!(row.uuid, "a");
        assert_eq!(row.creation_date, ts(100));
        assert_eq!(row.status, AllowanceStatus::Enabled);
        assert_eq!(row.frequency, "weekly");
        assert_eq!(row.day, "friday");
        assert_eq!(row.next_payment_day, Some(6));
        assert_eq!(row.updated_at, ts(900));
    }

    #[test]
    fn test_merge_leaves_unmatched_records_and_drops_unknown_users() {
        let original = vec![
            record("b", AllowanceStatus::Enabled, Some(15)),
            record("a", AllowanceStatus::Disabled, None),
        ];
        let updates = BTreeMap::from([
            ("a".to_string(), update(20, 900)),
            ("ghost".to_string(), update(6, 900)),
        ]);

        let merged = merge(&original, &updates);

        let uuids: Vec<&str> = merged.iter().map(|r| r.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["b", "a"]);
        assert_eq!(merged[0], original[0]);
        assert_eq!(merged[1].next_payment_day, Some(20));
    }

    #[test]
    fn test_merge_applies_update_to_every_row_of_a_repeated_uuid() {
        let original = vec![
            record("a", AllowanceStatus::Enabled, Some(1)),
            record("a", AllowanceStatus::Disabled, Some(1)),
            record("b", AllowanceStatus::Enabled, Some(15)),
        ];
        let updates = BTreeMap::from([
            ("a".to_string(), update(6, 900)),
            ("ghost".to_string(), update(13, 900)),
        ]);

        let merged = merge(&original, &updates);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].next_payment_day, Some(6));
        assert_eq!(merged[1].next_payment_day, Some(6));
        assert_eq!(merged[2], original[2]);
        assert!(merged.iter().all(|r| r.uuid != "ghost"));
    }

    #[test]
    fn test_merge_failed_update_clears_payment_day() {
        let original = vec![record("a", AllowanceStatus::Enabled, Some(15))];
        let mut failed = update(1, 900);
        failed.next_payment = Err(ScheduleError::InvalidWeekday("x".to_string()));
        let updates = BTreeMap::from([("a".to_string(), failed)]);

        let merged = merge(&original, &updates);
        assert_eq!(merged[0].next_payment_day, None);
        assert_eq!(merged[0].updated_at, ts(900));
    }

    #[test]
    fn test_project_schedule_filters_disabled() {
        let records = vec![
            record("a", AllowanceStatus::Enabled, Some(15)),
            record("b", AllowanceStatus::Disabled, Some(1)),
            record("c", AllowanceStatus::Enabled, None),
        ];

        let enabled = project_schedule(&records, true);
        assert_eq!(
            enabled,
            vec![
                PaymentScheduleRecord { uuid: "a".to_string(), payment_date: Some(15) },
                PaymentScheduleRecord { uuid: "c".to_string(), payment_date: None },
            ]
        );

        let all = project_schedule(&records, false);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].payment_date, Some(1));
    }

    #[test]
    fn test_disabled_user_updated_but_not_scheduled() {
        let original = vec![
            record("enabled-user", AllowanceStatus::Enabled, Some(1)),
            record("disabled-user", AllowanceStatus::Disabled, Some(1)),
        ];
        let events = vec![
            AllowanceEvent {
                user_id: "disabled-user".to_string(),
                timestamp: ts(1_000),
                frequency: "monthly".to_string(),
                raw_day: "20th".to_string(),
            },
            AllowanceEvent {
                user_id: "enabled-user".to_string(),
                timestamp: ts(1_000),
                frequency: "monthly".to_string(),
                raw_day: "15th".to_string(),
            },
        ];
        let reference = NaiveDate::from_ymd_opt(2024, 12, 3).unwrap();

        let merged = merge(&original, &reconcile(&events, reference));
        assert_eq!(merged[1].day, "20th");
        assert_eq!(merged[1].next_payment_day, Some(20));
        assert_eq!(merged[1].status, AllowanceStatus::Disabled);

        let schedule = project_schedule(&merged, true);
        assert_eq!(
            schedule,
            vec![PaymentScheduleRecord {
                uuid: "enabled-user".to_string(),
                payment_date: Some(15),
            }]
        );
    }
}
