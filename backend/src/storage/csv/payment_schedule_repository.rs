//! # CSV Payment Schedule Repository
//!
//! Reads and writes the payment schedule table (`uuid,payment_date`). Older
//! exports call the key column `user_id`; it is accepted on load.

use anyhow::{anyhow, Context, Result};
use csv::{Reader, Writer};
use std::fs::File;
use std::io::BufReader;
use tracing::{debug, info, warn};

use super::connection::CsvConnection;
use crate::domain::models::PaymentScheduleRecord;
use crate::storage::mappers::PaymentScheduleMapper;
use crate::storage::traits::PaymentScheduleStorage;
use shared::PaymentScheduleRow;

#[derive(Clone)]
pub struct PaymentScheduleRepository {
    connection: CsvConnection,
}

impl PaymentScheduleRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }
}

impl PaymentScheduleStorage for PaymentScheduleRepository {
    fn load_payment_schedule(&self) -> Result<Vec<PaymentScheduleRecord>> {
        let path = self.connection.payment_schedule_path();
        if !path.exists() {
            warn!("No payment schedule table at {:?}, starting empty", path);
            return Ok(Vec::new());
        }

        let file = File::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
        let mut reader = Reader::from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for (line, result) in reader.deserialize::<PaymentScheduleRow>().enumerate() {
            let row = result.with_context(|| format!("Malformed row {} in {:?}", line + 1, path))?;
            records.push(PaymentScheduleMapper::to_domain(row)?);
        }

        info!("Loaded {} payment schedule records from {:?}", records.len(), path);
        Ok(records)
    }

    fn store_payment_schedule(&self, records: &[PaymentScheduleRecord]) -> Result<()> {
        let path = self.connection.payment_schedule_path();
        let mut writer = Writer::from_writer(Vec::new());
        // header is written even for an empty schedule
        writer.write_record(["uuid", "payment_date"])?;
        for record in records {
            let row = PaymentScheduleMapper::to_row(record);
            writer.write_record([row.uuid.as_str(), row.payment_date.as_deref().unwrap_or("")])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush payment schedule: {}", e.error()))?;

        self.connection.write_atomically(&path, &bytes)?;
        debug!("Stored {} payment schedule records to {:?}", records.len(), path);
        Ok(())
    }
}
