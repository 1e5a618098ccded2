//! Shared timestamp and validation helpers.

pub mod timestamps;
pub mod validation;

pub use timestamps::{iso_timestamp, Timestamp};
pub use validation::{ensure_unit_range, non_empty};
