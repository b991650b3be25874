//! Wire-level row types shared between the payment schedule engine and the
//! tools that read or write its tables.
//!
//! These structs mirror the on-disk table shapes column for column. Values are
//! kept close to their raw textual form (timestamps may arrive as Unix seconds
//! or ISO-8601, day numbers as `"15"` or `"15.0"`); the backend maps them to
//! typed domain models.

use serde::{Deserialize, Serialize};

/// One row of the allowance backend table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceBackendRow {
    pub uuid: String,
    /// Unix seconds or ISO-8601
    pub creation_date: String,
    /// `enabled` or `disabled`
    pub status: String,
    pub frequency: String,
    /// Raw scheduled day as last reported by the user (e.g. `15th`, `monday`)
    pub day: String,
    /// Day-of-month of the next payment, empty when unknown
    #[serde(default)]
    pub next_payment_day: Option<String>,
    /// Unix seconds or ISO-8601
    pub updated_at: String,
}

/// One row of the payment schedule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleRow {
    /// Older exports name this column `user_id`
    #[serde(alias = "user_id")]
    pub uuid: String,
    #[serde(default)]
    pub payment_date: Option<String>,
}

/// A single `(key, column)` difference between two versions of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChangeRow {
    pub uuid: String,
    pub column: String,
    pub original: Option<String>,
    pub updated: Option<String>,
}

/// Summary of one reconciliation run, suitable for printing or exporting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub reference_date: String,
    pub events_loaded: usize,
    pub users_reconciled: usize,
    pub failed_schedules: usize,
    pub allowance_rows: usize,
    pub schedule_rows: usize,
    pub changes: Vec<ColumnChangeRow>,
}
