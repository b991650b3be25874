//! Column-level diff between two versions of a keyed table.
//!
//! Rows are matched by key (outer join). Columns come from the original row,
//! or from the updated row when the key is new. Two absent values compare
//! equal; an absent value against a present one is a change.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::domain::models::{AllowanceRecord, PaymentScheduleRecord};

/// Columns audited by default
pub const PAYMENT_COLUMNS: [&str; 2] = ["next_payment_day", "payment_date"];

/// A row that can take part in a table diff
pub trait KeyedRow {
    fn key(&self) -> &str;

    /// Column name and value pairs, in schema order, excluding the key
    fn columns(&self) -> Vec<(&'static str, Option<String>)>;
}

/// One changed cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChange {
    pub key: String,
    pub column: String,
    pub original: Option<String>,
    pub updated: Option<String>,
}

/// Compare two versions of a table, optionally restricted to some columns
pub fn diff_tables<R: KeyedRow>(
    original: &[R],
    updated: &[R],
    only_columns: Option<&[String]>,
) -> Vec<ColumnChange> {
    let original_by_key: HashMap<&str, &R> = original.iter().map(|r| (r.key(), r)).collect();
    let updated_by_key: HashMap<&str, &R> = updated.iter().map(|r| (r.key(), r)).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let keys: Vec<&str> = original
        .iter()
        .chain(updated.iter())
        .map(|row| row.key())
        .filter(|key| seen.insert(*key))
        .collect();

    let wanted = |column: &str| match only_columns {
        Some(columns) => columns.iter().any(|c| c == column),
        None => true,
    };

    let mut changes = Vec::new();
    for key in keys {
        let before = original_by_key.get(key).map(|r| r.columns());
        let after = updated_by_key.get(key).map(|r| r.columns());

        let schema: Vec<&'static str> = before
            .as_ref()
            .or(after.as_ref())
            .map(|cols| cols.iter().map(|(name, _)| *name).collect())
            .unwrap_or_default();

        for column in schema.into_iter().filter(|c| wanted(*c)) {
            let original_value = lookup(before.as_deref(), column);
            let updated_value = lookup(after.as_deref(), column);
            if original_value != updated_value {
                changes.push(ColumnChange {
                    key: key.to_string(),
                    column: column.to_string(),
                    original: original_value,
                    updated: updated_value,
                });
            }
        }
    }

    debug!("Table diff found {} changed cells", changes.len());
    changes
}

fn lookup(columns: Option<&[(&'static str, Option<String>)]>, name: &str) -> Option<String> {
    columns?
        .iter()
        .find(|(column, _)| *column == name)
        .and_then(|(_, value)| value.clone())
}

impl KeyedRow for AllowanceRecord {
    fn key(&self) -> &str {
        &self.uuid
    }

    fn columns(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("creation_date", Some(self.creation_date.to_rfc3339())),
            ("status", Some(self.status.to_string())),
            ("frequency", Some(self.frequency.clone())),
            ("day", Some(self.day.clone())),
            ("next_payment_day", self.next_payment_day.map(|d| d.to_string())),
            ("updated_at", Some(self.updated_at.to_rfc3339())),
        ]
    }
}

impl KeyedRow for PaymentScheduleRecord {
    fn key(&self) -> &str {
        &self.uuid
    }

    fn columns(&self) -> Vec<(&'static str, Option<String>)> {
        vec![("payment_date", self.payment_date.map(|d| d.to_string()))]
    }
}
