//! Mappers for converting between domain models and the wire rows in `shared`.

use anyhow::{anyhow, Context, Result};

use crate::domain::diff_service::ColumnChange;
use crate::domain::models::{AllowanceRecord, AllowanceStatus, PaymentScheduleRecord};
use crate::storage::timestamp::{format_timestamp, parse_unix_or_date};
use shared::{AllowanceBackendRow, ColumnChangeRow, PaymentScheduleRow};

pub struct AllowanceRecordMapper;

impl AllowanceRecordMapper {
    pub fn to_row(record: &AllowanceRecord) -> AllowanceBackendRow {
        AllowanceBackendRow {
            uuid: record.uuid.clone(),
            creation_date: format_timestamp(&record.creation_date),
            status: record.status.to_string(),
            frequency: record.frequency.clone(),
            day: record.day.clone(),
            next_payment_day: record.next_payment_day.map(|d| d.to_string()),
            updated_at: format_timestamp(&record.updated_at),
        }
    }

    pub fn to_domain(row: AllowanceBackendRow) -> Result<AllowanceRecord> {
        let creation_date = parse_unix_or_date(&row.creation_date)
            .with_context(|| format!("creation_date of allowance '{}'", row.uuid))?;
        let updated_at = parse_unix_or_date(&row.updated_at)
            .with_context(|| format!("updated_at of allowance '{}'", row.uuid))?;
        let status = row
            .status
            .parse::<AllowanceStatus>()
            .with_context(|| format!("status of allowance '{}'", row.uuid))?;
        let next_payment_day = parse_day_of_month(row.next_payment_day.as_deref())
            .with_context(|| format!("next_payment_day of allowance '{}'", row.uuid))?;

        Ok(AllowanceRecord {
            uuid: row.uuid,
            creation_date,
            status,
            frequency: row.frequency,
            day: row.day,
            next_payment_day,
            updated_at,
        })
    }
}

pub struct PaymentScheduleMapper;

impl PaymentScheduleMapper {
    pub fn to_row(record: &PaymentScheduleRecord) -> PaymentScheduleRow {
        PaymentScheduleRow {
            uuid: record.uuid.clone(),
            payment_date: record.payment_date.map(|d| d.to_string()),
        }
    }

    pub fn to_domain(row: PaymentScheduleRow) -> Result<PaymentScheduleRecord> {
        let payment_date = parse_day_of_month(row.payment_date.as_deref())
            .with_context(|| format!("payment_date of '{}'", row.uuid))?;
        Ok(PaymentScheduleRecord {
            uuid: row.uuid,
            payment_date,
        })
    }
}

pub struct ColumnChangeMapper;

impl ColumnChangeMapper {
    pub fn to_row(change: ColumnChange) -> ColumnChangeRow {
        ColumnChangeRow {
            uuid: change.key,
            column: change.column,
            original: change.original,
            updated: change.updated,
        }
    }
}

/// Day-of-month columns may have been written as floats (`15.0`) by other tools
fn parse_day_of_month(raw: Option<&str>) -> Result<Option<u32>> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) if v.eq_ignore_ascii_case("nan") => return Ok(None),
        Some(v) => v,
    };

    if let Ok(day) = value.parse::<u32>() {
        return Ok(Some(day));
    }

    let float: f64 = value
        .parse()
        .map_err(|_| anyhow!("Invalid day of month: '{}'", value))?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= f64::from(u32::MAX) {
        Ok(Some(float as u32))
    } else {
        Err(anyhow!("Invalid day of month: '{}'", value))
    }
}
