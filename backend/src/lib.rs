//! # Payment Schedule Backend
//!
//! Recomputes the next allowance payment day for every user from the
//! allowance event log and reconciles it into the allowance backend table.
//!
//! ## Architecture
//!
//! ```text
//! CLI (main.rs)
//!     ↓
//! Domain Layer (normalize, recurrence, reconcile, merge, diff)
//!     ↓
//! Storage Layer (CSV tables, JSON event log)
//! ```

pub mod config;
pub mod domain;
pub mod storage;

pub use config::RunConfig;
pub use domain::models;
pub use domain::{PaymentScheduleService, RunReport};
