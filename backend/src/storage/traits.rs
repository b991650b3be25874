//! # Storage Traits
//!
//! Abstractions over the tabular data store the payment schedule run reads
//! from and writes to. The domain layer only sees these traits; the CSV/JSON
//! implementations live in `storage::csv`.

use anyhow::Result;

use crate::domain::models::{AllowanceEvent, AllowanceRecord, PaymentScheduleRecord};

/// Source of allowance schedule events
pub trait EventLogStorage: Send + Sync {
    /// Load every parseable event, in log order
    fn load_events(&self) -> Result<Vec<AllowanceEvent>>;
}

/// Storage for the allowance backend table
pub trait AllowanceTableStorage: Send + Sync {
    /// Load the table ordered by creation date (stable for equal dates)
    fn load_allowance_table(&self) -> Result<Vec<AllowanceRecord>>;

    /// Replace the stored table
    fn store_allowance_table(&self, records: &[AllowanceRecord]) -> Result<()>;
}

/// Storage for the payment schedule table
pub trait PaymentScheduleStorage: Send + Sync {
    /// Load the stored schedule; an absent table loads as empty
    fn load_payment_schedule(&self) -> Result<Vec<PaymentScheduleRecord>>;

    /// Replace the stored schedule
    fn store_payment_schedule(&self, records: &[PaymentScheduleRecord]) -> Result<()>;
}
