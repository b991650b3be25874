//! # Storage Module
//!
//! Loads and stores the tables the payment schedule run works on. The domain
//! layer depends only on the traits in `traits`; `csv` provides the
//! file-backed implementations, `mappers` converts between the wire rows in
//! `shared` and domain models, and `timestamp` normalizes the mixed Unix /
//! ISO-8601 timestamps found in the inputs.

pub mod csv;
pub mod mappers;
pub mod timestamp;
pub mod traits;

pub use self::csv::{
    AllowanceTableRepository, CsvConnection, EventLogRepository, PaymentScheduleRepository, TableFiles,
};
pub use traits::{AllowanceTableStorage, EventLogStorage, PaymentScheduleStorage};
