//! Run configuration, loaded from a YAML file.
//!
//! ```yaml
//! data_directory: data
//! output_directory: output
//! reference_date: 2024-12-03
//! only_enabled: true
//! diff_columns: [next_payment_day, payment_date]
//! files:
//!   allowance_table: allowance_backend_table.csv
//!   payment_schedule: payment_schedule_backend_table.csv
//!   events: allowance_events.json
//! ```
//!
//! Every key is optional.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::diff_service::PAYMENT_COLUMNS;
use crate::storage::TableFiles;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory holding the input tables
    pub data_directory: PathBuf,
    /// Directory the updated tables are written to
    pub output_directory: PathBuf,
    /// As-of date of the run
    pub reference_date: NaiveDate,
    /// Only enabled allowances appear in the payment schedule
    pub only_enabled: bool,
    /// Columns reported by the diff
    pub diff_columns: Vec<String>,
    pub files: TableFiles,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data"),
            output_directory: PathBuf::from("output"),
            reference_date: default_reference_date(),
            only_enabled: true,
            diff_columns: PAYMENT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            files: TableFiles::default(),
        }
    }
}

impl RunConfig {
    /// Load the config file, or the defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        let yaml_content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {:?}", path))?;
        let config = Self::from_yaml(&yaml_content)
            .with_context(|| format!("Invalid config {:?}", path))?;
        info!("Loaded run config from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml_content)?)
    }
}

/// As-of date of the reference data set
fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 3).unwrap_or_default()
}
