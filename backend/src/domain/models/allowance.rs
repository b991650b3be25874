//! Domain models for the allowance backend table, the event log it is
//! reconciled from, and the payment schedule projected out of it.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::schedule::ScheduleError;

/// A schedule change submitted by a user. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowanceEvent {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub frequency: String,
    pub raw_day: String,
}

/// Whether an allowance currently pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowanceStatus {
    Enabled,
    Disabled,
}

impl AllowanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllowanceStatus::Enabled => "enabled",
            AllowanceStatus::Disabled => "disabled",
        }
    }
}

impl FromStr for AllowanceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enabled" => Ok(AllowanceStatus::Enabled),
            "disabled" => Ok(AllowanceStatus::Disabled),
            other => Err(anyhow::anyhow!("Invalid allowance status: {}", other)),
        }
    }
}

impl fmt::Display for AllowanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the allowance backend table, one per user.
///
/// `uuid`, `creation_date` and `status` are never changed by reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowanceRecord {
    pub uuid: String,
    pub creation_date: DateTime<Utc>,
    pub status: AllowanceStatus,
    pub frequency: String,
    /// Raw scheduled day as last reported
    pub day: String,
    /// Day-of-month of the next payment
    pub next_payment_day: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

impl AllowanceRecord {
    pub fn is_enabled(&self) -> bool {
        self.status == AllowanceStatus::Enabled
    }
}

/// Field set computed for one user from their latest event
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledUpdate {
    pub frequency: String,
    pub raw_day: String,
    /// Full next payment date, or the reason it could not be computed
    pub next_payment: Result<NaiveDate, ScheduleError>,
    /// Latest timestamp among all of the user's events
    pub updated_at: DateTime<Utc>,
}

impl ReconciledUpdate {
    /// Day-of-month written to the backend table. Month and year are dropped.
    pub fn next_payment_day(&self) -> Option<u32> {
        self.next_payment.as_ref().ok().map(|date| date.day())
    }

    pub fn failure(&self) -> Option<&ScheduleError> {
        self.next_payment.as_ref().err()
    }
}

/// Projection of an enabled allowance into the payment schedule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentScheduleRecord {
    pub uuid: String,
    pub payment_date: Option<u32>,
}
