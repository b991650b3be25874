pub mod allowance;
pub mod schedule;

pub use allowance::*;
pub use schedule::*;
