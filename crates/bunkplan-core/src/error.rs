//! Error types for domain model construction.

use thiserror::Error;

/// Error raised when constructing a domain value from invalid parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Camp age months component out of range.
    #[error("invalid camp age: {years}.{months:02} (months must be < 12)")]
    InvalidAge { years: u8, months: u8 },

    /// Camp age string that does not parse as `Y.MM`.
    #[error("unparseable camp age: {0:?}")]
    UnparseableAge(String),

    /// Age band with min above max.
    #[error("invalid age band: min {min} is above max {max}")]
    InvalidAgeBand { min: String, max: String },

    /// Request weight must be positive.
    #[error("request {request} has zero weight")]
    ZeroWeight { request: u64 },
}

/// Result type alias for domain model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
