//! # CSV Allowance Table Repository
//!
//! Reads and writes the allowance backend table:
//!
//! ```csv
//! uuid,creation_date,status,frequency,day,next_payment_day,updated_at
//! 0b6f...,1700000000,enabled,monthly,15th,15.0,2024-11-01T08:00:00Z
//! ```
//!
//! Timestamps may be Unix seconds or ISO-8601 on input and are written back
//! as RFC 3339. Rows are returned sorted by creation date.

use anyhow::{anyhow, Context, Result};
use csv::{Reader, WriterBuilder};
use std::fs::File;
use std::io::BufReader;
use tracing::{debug, info};

use super::connection::CsvConnection;
use crate::domain::models::AllowanceRecord;
use crate::storage::mappers::AllowanceRecordMapper;
use crate::storage::traits::AllowanceTableStorage;
use shared::AllowanceBackendRow;

const ALLOWANCE_TABLE_HEADER: [&str; 7] = [
    "uuid",
    "creation_date",
    "status",
    "frequency",
    "day",
    "next_payment_day",
    "updated_at",
];

#[derive(Clone)]
pub struct AllowanceTableRepository {
    connection: CsvConnection,
}

impl AllowanceTableRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl AllowanceTableStorage for AllowanceTableRepository {
    fn load_allowance_table(&self) -> Result<Vec<AllowanceRecord>> {
        let path = self.connection.allowance_table_path();
        let file = File::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
        let mut reader = Reader::from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for (line, result) in reader.deserialize::<AllowanceBackendRow>().enumerate() {
            let row = result.with_context(|| format!("Malformed row {} in {:?}", line + 1, path))?;
            records.push(AllowanceRecordMapper::to_domain(row)?);
        }

        records.sort_by_key(|r| r.creation_date);
        info!("Loaded {} allowance records from {:?}", records.len(), path);
        Ok(records)
    }

    fn store_allowance_table(&self, records: &[AllowanceRecord]) -> Result<()> {
        let path = self.connection.allowance_table_path();
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        // header is written even for an empty table
        writer.write_record(ALLOWANCE_TABLE_HEADER)?;
        for record in records {
            writer.serialize(AllowanceRecordMapper::to_row(record))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush allowance table: {}", e.error()))?;

        self.connection.write_atomically(&path, &bytes)?;
        debug!("Stored {} allowance records to {:?}", records.len(), path);
        Ok(())
    }
}
