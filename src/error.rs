//! Error types for benefit calculations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result alias used by every calculation in the engine.
pub type BenefitsResult<T> = Result<T, BenefitsError>;

/// Validation failures raised before any line item is produced.
///
/// A calculation either completes or fails with one of these; partial
/// results are never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenefitsError {
    #[error("invalid range: {end} precedes {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid amount for {field}: {value}")]
    InvalidAmount { field: &'static str, value: Decimal },

    #[error("invalid divisor for {field}: {value}")]
    InvalidDivisor { field: &'static str, value: Decimal },

    #[error("missing required input: {0}")]
    MissingRequiredInput(&'static str),

    #[error("no statutory table loaded for reference year {0}")]
    UnknownReferenceYear(i32),

    #[error("invalid statutory table for {year}: {reason}")]
    InvalidTable { year: i32, reason: String },
}
