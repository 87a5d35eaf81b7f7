//! Fee model for delta-neutral round trips
//!
//! An arbitrage needs four trades: open long, open short, close long,
//! close short. Each leg's round trip costs twice its per-trade fee.

use rust_decimal::Decimal;
use tracing::warn;

use crate::core::errors::{EngineError, EngineResult};
use crate::core::types::FeeStructure;

/// Upper sanity bound for a single trade fee (1% of notional)
pub const MAX_FEE_FRACTION: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

impl FeeStructure {
    /// Create a fee schedule, rejecting values outside [0, 0.01].
    pub fn new(maker_fee_percent: Decimal, taker_fee_percent: Decimal) -> EngineResult<Self> {
        let fees = Self {
            maker_fee_percent,
            taker_fee_percent,
        };
        fees.validate("unnamed")?;
        Ok(fees)
    }

    /// Check both fees sit inside [0, 0.01].
    ///
    /// Anything above 1% per trade is almost certainly a unit mix-up
    /// (percent entered where a fraction was expected).
    pub fn validate(&self, dex: &str) -> EngineResult<()> {
        for (name, value) in [
            ("maker", self.maker_fee_percent),
            ("taker", self.taker_fee_percent),
        ] {
            if value < Decimal::ZERO || value > MAX_FEE_FRACTION {
                return Err(EngineError::InvalidFee {
                    dex: dex.to_string(),
                    reason: format!(
                        "{} fee {} outside [0, {}]",
                        name, value, MAX_FEE_FRACTION
                    ),
                });
            }
        }
        Ok(())
    }

    /// Expected convention: taker >= maker.
    #[inline]
    pub fn follows_convention(&self) -> bool {
        self.taker_fee_percent >= self.maker_fee_percent
    }

    /// Per-trade fee for the chosen liquidity side
    #[inline]
    pub fn trade_fee(&self, use_taker: bool) -> Decimal {
        if use_taker {
            self.taker_fee_percent
        } else {
            self.maker_fee_percent
        }
    }
}

/// Open + close cost of one leg, as a fraction of notional.
#[inline]
pub fn round_trip_cost(fee_structure: &FeeStructure, use_taker: bool) -> Decimal {
    Decimal::TWO * fee_structure.trade_fee(use_taker)
}

/// Cost of all four trades of a delta-neutral pair.
///
/// Taker is the conservative default: opportunistic entries rarely get
/// maker fills.
#[inline]
pub fn total_arbitrage_cost(
    long_fees: &FeeStructure,
    short_fees: &FeeStructure,
    use_taker: bool,
) -> Decimal {
    round_trip_cost(long_fees, use_taker) + round_trip_cost(short_fees, use_taker)
}

/// Log fee schedules that break the taker >= maker convention.
///
/// Returns the number of flagged schedules.
pub fn flag_unconventional<'a, I>(schedules: I) -> usize
where
    I: IntoIterator<Item = (&'a str, &'a FeeStructure)>,
{
    let mut flagged = 0;
    for (dex, fees) in schedules {
        if !fees.follows_convention() {
            flagged += 1;
            warn!(
                dex = dex,
                maker = %fees.maker_fee_percent,
                taker = %fees.taker_fee_percent,
                "[FEES] Maker fee above taker fee, check schedule"
            );
        }
    }
    flagged
}
