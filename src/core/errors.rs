//! Opportunity engine error types
//!
//! Data-quality problems (bad interval, malformed quote) are reported with
//! these variants so callers can log and skip the offending record.
//! Configuration mistakes (`InvalidFilter`, `InvalidFee`) are surfaced
//! eagerly at construction time.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the opportunity detection engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Funding interval is zero or negative (division-by-zero guard)
    #[error("Invalid funding interval: {interval_hours}h (must be > 0)")]
    InvalidInterval { interval_hours: Decimal },

    /// Rate or interval too extreme to normalize without overflow
    #[error("Funding rate {funding_rate} per {interval_hours}h is out of range")]
    RateOutOfRange {
        funding_rate: Decimal,
        interval_hours: Decimal,
    },

    /// Filter configuration rejected at construction time
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Fee schedule outside sanity bounds
    #[error("Invalid fee schedule for {dex}: {reason}")]
    InvalidFee { dex: String, reason: String },

    /// Quote missing a required field or carrying an impossible value
    #[error("Malformed quote from {dex}: {reason}")]
    MalformedQuote { dex: String, reason: String },
}

/// Result type alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;
