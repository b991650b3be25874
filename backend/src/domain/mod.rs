//! # Domain Module
//!
//! Business logic for recomputing allowance payment schedules.
//!
//! ## Module Organization
//!
//! - **models**: schedules, events, allowance records and their errors
//! - **schedule_normalizer**: raw `(frequency, day)` strings to `CanonicalSchedule`
//! - **recurrence**: next payment date for each frequency class
//! - **reconciliation_service**: latest event per user to a schedule update
//! - **backend_table**: applying updates to the allowance table and projecting
//!   the payment schedule
//! - **diff_service**: column-level audit between two versions of a table
//! - **payment_schedule_service**: the end-to-end run over stored tables
//!
//! Everything except `payment_schedule_service` is pure: the reference date
//! is always passed in, never read from a clock.

pub mod backend_table;
pub mod diff_service;
pub mod models;
pub mod payment_schedule_service;
pub mod recurrence;
pub mod reconciliation_service;
pub mod schedule_normalizer;

pub use backend_table::{merge, project_schedule};
pub use diff_service::{diff_tables, ColumnChange, KeyedRow, PAYMENT_COLUMNS};
pub use payment_schedule_service::{PaymentScheduleService, RunReport};
pub use recurrence::next_payment_date;
pub use reconciliation_service::{events_for_user, reconcile};
pub use schedule_normalizer::normalize;
