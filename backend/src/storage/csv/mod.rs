//! # File Storage Module
//!
//! File-backed implementations of the storage traits. All tables of one run
//! live in a single data directory:
//!
//! ```text
//! data/
//! ├── allowance_backend_table.csv
//! ├── payment_schedule_backend_table.csv
//! └── allowance_events.json
//! ```
//!
//! Writes go to a temp file first and are renamed into place.

pub mod allowance_table_repository;
pub mod connection;
pub mod event_log_repository;
pub mod payment_schedule_repository;

pub use allowance_table_repository::AllowanceTableRepository;
pub use connection::{CsvConnection, TableFiles};
pub use event_log_repository::EventLogRepository;
pub use payment_schedule_repository::PaymentScheduleRepository;
