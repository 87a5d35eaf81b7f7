//! Delta-neutral balance check for open cross-DEX positions.
//!
//! Called on every live-position poll tick. A `None` fraction means the
//! legs could not be assessed (missing, zero or negative size); callers
//! run their own liquidation detection for that case.

use rust_decimal::Decimal;

use crate::core::types::LegPair;

/// Default tolerance: legs may differ by up to 5% of the larger leg
pub const DEFAULT_IMBALANCE_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Relative size difference between two legs, in [0, 1).
///
/// `(max(|l|,|s|) - min(|l|,|s|)) / max(|l|,|s|)`, order independent.
pub fn imbalance_fraction(long_qty: Option<Decimal>, short_qty: Option<Decimal>) -> Option<Decimal> {
    let (long_qty, short_qty) = (long_qty?, short_qty?);
    if long_qty <= Decimal::ZERO || short_qty <= Decimal::ZERO {
        return None;
    }
    let (a, b) = (long_qty.abs(), short_qty.abs());
    let (larger, smaller) = if a >= b { (a, b) } else { (b, a) };
    Some((larger - smaller) / larger)
}

/// True iff the fraction is known and strictly above `threshold`.
#[inline]
pub fn is_imbalanced(long_qty: Option<Decimal>, short_qty: Option<Decimal>, threshold: Decimal) -> bool {
    matches!(imbalance_fraction(long_qty, short_qty), Some(f) if f > threshold)
}

/// Stateless detector holding a configured threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionImbalanceDetector {
    pub threshold: Decimal,
}

impl PositionImbalanceDetector {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    pub fn imbalance_fraction(&self, legs: &LegPair) -> Option<Decimal> {
        imbalance_fraction(legs.long_quantity, legs.short_quantity)
    }

    pub fn is_imbalanced(&self, legs: &LegPair) -> bool {
        is_imbalanced(legs.long_quantity, legs.short_quantity, self.threshold)
    }
}

impl Default for PositionImbalanceDetector {
    fn default() -> Self {
        Self::new(DEFAULT_IMBALANCE_THRESHOLD)
    }
}
