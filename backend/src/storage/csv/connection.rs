use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File names of the tables inside a data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFiles {
    pub allowance_table: String,
    pub payment_schedule: String,
    pub events: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            allowance_table: "allowance_backend_table.csv".to_string(),
            payment_schedule: "payment_schedule_backend_table.csv".to_string(),
            events: "allowance_events.json".to_string(),
        }
    }
}

/// CsvConnection resolves table paths inside one data directory
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    files: TableFiles,
}

impl CsvConnection {
    /// Create a connection using the default table file names
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Self {
        Self::with_files(base_directory, TableFiles::default())
    }

    pub fn with_files<P: AsRef<Path>>(base_directory: P, files: TableFiles) -> Self {
        Self {
            base_directory: base_directory.as_ref().to_path_buf(),
            files,
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn allowance_table_path(&self) -> PathBuf {
        self.base_directory.join(&self.files.allowance_table)
    }

    pub fn payment_schedule_path(&self) -> PathBuf {
        self.base_directory.join(&self.files.payment_schedule)
    }

    pub fn events_path(&self) -> PathBuf {
        self.base_directory.join(&self.files.events)
    }

    /// Create the base directory if it doesn't exist
    pub fn ensure_base_directory_exists(&self) -> Result<()> {
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory).with_context(|| {
                format!("Failed to create data directory {:?}", self.base_directory)
            })?;
            info!("Created data directory {:?}", self.base_directory);
        }
        Ok(())
    }

    /// Write a file atomically: write to a temp file, then rename
    pub fn write_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.ensure_base_directory_exists()?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move {:?} to {:?}", temp_path, path))?;
        Ok(())
    }
}
