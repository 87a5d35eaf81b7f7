//! Funding rate normalization
//!
//! Venues settle funding on different cadences (hourly on Hyperliquid,
//! 8-hourly on most CEX-style perps). Rates are only comparable once they
//! are reduced to the same time basis, so everything downstream works in
//! per-second terms.

use rust_decimal::Decimal;

use crate::core::errors::{EngineError, EngineResult};

/// Seconds in one hour
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Convert a per-interval funding rate into a per-second rate.
///
/// Returns `InvalidInterval` when `funding_interval_hours <= 0`, and
/// `RateOutOfRange` when either step leaves the `Decimal` range.
#[inline]
pub fn normalize(funding_rate: Decimal, funding_interval_hours: Decimal) -> EngineResult<Decimal> {
    if funding_interval_hours <= Decimal::ZERO {
        return Err(EngineError::InvalidInterval {
            interval_hours: funding_interval_hours,
        });
    }
    let out_of_range = || EngineError::RateOutOfRange {
        funding_rate,
        interval_hours: funding_interval_hours,
    };
    let interval_seconds = funding_interval_hours
        .checked_mul(Decimal::from(SECONDS_PER_HOUR))
        .ok_or_else(out_of_range)?;
    funding_rate
        .checked_div(interval_seconds)
        .ok_or_else(out_of_range)
}

/// Scale a per-second rate back up to a per-interval rate.
///
/// `None` if the result does not fit in a `Decimal`.
#[inline]
pub fn per_interval(rate_per_second: Decimal, interval_hours: Decimal) -> Option<Decimal> {
    rate_per_second
        .checked_mul(interval_hours)?
        .checked_mul(Decimal::from(SECONDS_PER_HOUR))
}
