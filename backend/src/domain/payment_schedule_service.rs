use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::RunConfig;
use crate::domain::backend_table::{merge, project_schedule};
use crate::domain::diff_service::{diff_tables, ColumnChange};
use crate::domain::models::{AllowanceRecord, PaymentScheduleRecord, ReconciledUpdate};
use crate::domain::reconciliation_service::reconcile;
use crate::storage::mappers::ColumnChangeMapper;
use crate::storage::{
    AllowanceTableRepository, AllowanceTableStorage, CsvConnection, EventLogRepository,
    EventLogStorage, PaymentScheduleRepository, PaymentScheduleStorage,
};
use shared::RunSummary;

/// Everything one reconciliation run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub reference_date: NaiveDate,
    pub events_loaded: usize,
    pub updates: BTreeMap<String, ReconciledUpdate>,
    pub allowance_records: Vec<AllowanceRecord>,
    pub payment_schedule: Vec<PaymentScheduleRecord>,
    /// Audited changes to the allowance table, then to the payment schedule
    pub changes: Vec<ColumnChange>,
}

impl RunReport {
    pub fn failed_schedules(&self) -> usize {
        self.updates.values().filter(|u| u.failure().is_some()).count()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            reference_date: self.reference_date.to_string(),
            events_loaded: self.events_loaded,
            users_reconciled: self.updates.len(),
            failed_schedules: self.failed_schedules(),
            allowance_rows: self.allowance_records.len(),
            schedule_rows: self.payment_schedule.len(),
            changes: self
                .changes
                .iter()
                .cloned()
                .map(ColumnChangeMapper::to_row)
                .collect(),
        }
    }
}

/// Service that runs the full reconciliation: load the event log and the
/// current tables, recompute every user's schedule, and write the updated
/// tables out.
#[derive(Clone)]
pub struct PaymentScheduleService {
    event_log: EventLogRepository,
    source_allowances: AllowanceTableRepository,
    source_schedule: PaymentScheduleRepository,
    target_allowances: AllowanceTableRepository,
    target_schedule: PaymentScheduleRepository,
    only_enabled: bool,
    diff_columns: Vec<String>,
}

impl PaymentScheduleService {
    /// Create a service reading from `input` and writing to `output`
    pub fn new(input: CsvConnection, output: CsvConnection) -> Self {
        Self {
            event_log: EventLogRepository::new(input.clone()),
            source_allowances: AllowanceTableRepository::new(input.clone()),
            source_schedule: PaymentScheduleRepository::new(input),
            target_allowances: AllowanceTableRepository::new(output.clone()),
            target_schedule: PaymentScheduleRepository::new(output),
            only_enabled: true,
            diff_columns: Vec::new(),
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        let input = CsvConnection::with_files(&config.data_directory, config.files.clone());
        let output = CsvConnection::with_files(&config.output_directory, config.files.clone());
        Self::new(input, output)
            .with_only_enabled(config.only_enabled)
            .with_diff_columns(config.diff_columns.clone())
    }

    pub fn with_only_enabled(mut self, only_enabled: bool) -> Self {
        self.only_enabled = only_enabled;
        self
    }

    /// Restrict the audit to these columns; empty means all columns
    pub fn with_diff_columns(mut self, diff_columns: Vec<String>) -> Self {
        self.diff_columns = diff_columns;
        self
    }

    /// Compute the updated tables without writing anything
    pub fn compute(&self, reference_date: NaiveDate) -> Result<RunReport> {
        info!("Computing payment schedule as of {}", reference_date);

        let events = self.event_log.load_events()?;
        let original_records = self.source_allowances.load_allowance_table()?;
        let original_schedule = self.source_schedule.load_payment_schedule()?;

        let updates = reconcile(&events, reference_date);

        let allowance_records = merge(&original_records, &updates);
        let payment_schedule = project_schedule(&allowance_records, self.only_enabled);

        let columns = (!self.diff_columns.is_empty()).then_some(self.diff_columns.as_slice());
        let mut changes = diff_tables(&original_records, &allowance_records, columns);
        changes.extend(diff_tables(&original_schedule, &payment_schedule, columns));

        info!(
            "Run as of {}: {} users reconciled, {} allowance rows, {} schedule rows, {} changes",
            reference_date,
            updates.len(),
            allowance_records.len(),
            payment_schedule.len(),
            changes.len()
        );

        Ok(RunReport {
            reference_date,
            events_loaded: events.len(),
            updates,
            allowance_records,
            payment_schedule,
            changes,
        })
    }

    /// Compute the updated tables and write them to the output directory
    pub fn run(&self, reference_date: NaiveDate) -> Result<RunReport> {
        let report = self.compute(reference_date)?;
        self.target_allowances
            .store_allowance_table(&report.allowance_records)?;
        self.target_schedule
            .store_payment_schedule(&report.payment_schedule)?;
        info!("Stored updated allowance and payment schedule tables");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AllowanceStatus, ScheduleError};
    use std::fs;
    use tempfile::TempDir;

    const ALLOWANCES: &str = "\
uuid,creation_date,status,frequency,day,next_payment_day,updated_at
u1,1700000000,enabled,monthly,1st,1.0,1700000000
u2,1700000100,enabled,weekly,monday,2.0,1700000100
u3,1700000200,disabled,monthly,15th,15.0,1700000200
u4,1700000300,enabled,daily,daily,4.0,1700000300
";

    const SCHEDULE: &str = "\
user_id,payment_date
u1,1.0
u2,2.0
u4,4.0
";

    const EVENTS: &str = r#"[
        {"user": {"id": "u1"}, "event": {"timestamp": 1733000000},
         "allowance": {"scheduled": {"frequency": "monthly", "day": "1st"}}},
        {"user": {"id": "u1"}, "event": {"timestamp": "2024-12-01T10:00:00Z"},
         "allowance": {"scheduled": {"frequency": "monthly", "day": "15th"}}},
        {"user": {"id": "u2"}, "event": {"timestamp": 1733000000},
         "allowance": {"scheduled": {"frequency": "biweekly", "day": "Monday"}}},
        {"user": {"id": "u3"}, "event": {"timestamp": 1733000000},
         "allowance": {"scheduled": {"frequency": "monthly", "day": "31st"}}},
        {"user": {"id": "u4"}, "event": {"timestamp": 1733000000},
         "allowance": {"scheduled": {"frequency": "weekly", "day": "someday"}}},
        {"user": {"id": "ghost"}, "event": {"timestamp": 1733000000},
         "allowance": {"scheduled": {"frequency": "daily", "day": "daily"}}}
    ]"#;

    struct Fixture {
        _input: TempDir,
        output: TempDir,
        service: PaymentScheduleService,
    }

    fn fixture() -> Fixture {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let input_conn = CsvConnection::new(input.path());
        fs::write(input_conn.allowance_table_path(), ALLOWANCES).unwrap();
        fs::write(input_conn.payment_schedule_path(), SCHEDULE).unwrap();
        fs::write(input_conn.events_path(), EVENTS).unwrap();

        let service = PaymentScheduleService::new(input_conn, CsvConnection::new(output.path()))
            .with_diff_columns(vec!["next_payment_day".to_string(), "payment_date".to_string()]);
        Fixture {
            _input: input,
            output,
            service,
        }
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 3).unwrap()
    }

    #[test]
    fn test_compute_reconciles_every_user() {
        let f = fixture();
        let report = f.service.compute(reference()).unwrap();

        assert_eq!(report.events_loaded, 6);
        assert_eq!(report.updates.len(), 5);
        assert_eq!(report.failed_schedules(), 1);
        assert_eq!(
            report.updates["u4"].failure(),
            Some(&ScheduleError::InvalidWeekday("someday".to_string()))
        );

        let days: Vec<(&str, Option<u32>)> = report
            .allowance_records
            .iter()
            .map(|r| (r.uuid.as_str(), r.next_payment_day))
            .collect();
        // u1 latest event is 15th; u2 biweekly after 2024-12-03 is the 3rd Monday (16th);
        // u3 31st is still ahead in December; u4 failed
        assert_eq!(
            days,
            vec![("u1", Some(15)), ("u2", Some(16)), ("u3", Some(31)), ("u4", None)]
        );
        assert_eq!(report.allowance_records[2].status, AllowanceStatus::Disabled);
    }

    #[test]
    fn test_schedule_excludes_disabled_and_unknown_users() {
        let f = fixture();
        let report = f.service.compute(reference()).unwrap();

        let uuids: Vec<&str> = report.payment_schedule.iter().map(|r| r.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["u1", "u2", "u4"]);
    }

    #[test]
    fn test_changes_restricted_to_payment_columns() {
        let f = fixture();
        let report = f.service.compute(reference()).unwrap();

        assert!(report
            .changes
            .iter()
            .all(|c| c.column == "next_payment_day" || c.column == "payment_date"));
        let allowance_changes = report
            .changes
            .iter()
            .filter(|c| c.column == "next_payment_day")
            .count();
        let schedule_changes = report
            .changes
            .iter()
            .filter(|c| c.column == "payment_date")
            .count();
        assert_eq!(allowance_changes, 4);
        assert_eq!(schedule_changes, 3);

        let summary = report.summary();
        assert_eq!(summary.users_reconciled, 5);
        assert_eq!(summary.failed_schedules, 1);
        assert_eq!(summary.changes.len(), 7);
    }

    #[test]
    fn test_compute_writes_nothing() {
        let f = fixture();
        f.service.compute(reference()).unwrap();
        assert_eq!(fs::read_dir(f.output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_stores_updated_tables() {
        let f = fixture();
        let report = f.service.run(reference()).unwrap();

        let output = CsvConnection::new(f.output.path());
        let stored = AllowanceTableRepository::new(output.clone())
            .load_allowance_table()
            .unwrap();
        assert_eq!(stored, report.allowance_records);

        let schedule = fs::read_to_string(output.payment_schedule_path()).unwrap();
        assert_eq!(schedule, "uuid,payment_date\nu1,15\nu2,16\nu4,\n");
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let f = fixture();
        let first = f.service.compute(reference()).unwrap();
        let second = f.service.compute(reference()).unwrap();
        assert_eq!(first, second);
    }
}
