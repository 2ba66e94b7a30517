//! Census aggregation.
//!
//! Turns raw per-neighbourhood, per-year census rows into the derived tables
//! consumed by charts and reports. Every operation is a pure function of its
//! inputs.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
