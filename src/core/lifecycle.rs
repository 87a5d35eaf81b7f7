//! Position lifecycle checks for open delta-neutral pairs.
//!
//! Each poll tick loads the live size of both legs, asks the imbalance
//! detector whether the pair drifted, and turns the answer into an action
//! for the scheduler. A forced close also puts the symbol into cooldown so
//! the next scan does not re-enter it immediately.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::cooldown::CooldownManager;
use crate::core::imbalance::PositionImbalanceDetector;
use crate::core::types::{current_time_ms, DexId, LegPair};

// =============================================================================
// Leg State
// =============================================================================

/// Identifies one leg of a tracked position on its venue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LegId {
    pub dex: DexId,
    pub symbol: Arc<str>,
}

/// Last observed size of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegSnapshot {
    /// Signed size as reported by the venue
    pub quantity: Decimal,
    pub observed_at_ms: u64,
}

/// A leg is either waiting for its next poll or holds a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LegState {
    Unloaded(LegId),
    Loaded { id: LegId, snapshot: LegSnapshot },
}

impl LegState {
    pub fn new(dex: DexId, symbol: Arc<str>) -> Self {
        LegState::Unloaded(LegId { dex, symbol })
    }

    pub fn id(&self) -> &LegId {
        match self {
            LegState::Unloaded(id) | LegState::Loaded { id, .. } => id,
        }
    }

    /// Store a freshly polled size; `None` (no position found) leaves the
    /// leg unloaded.
    pub fn load(&mut self, quantity: Option<Decimal>) {
        let id = self.id().clone();
        *self = match quantity {
            Some(quantity) => LegState::Loaded {
                id,
                snapshot: LegSnapshot {
                    quantity,
                    observed_at_ms: current_time_ms(),
                },
            },
            None => LegState::Unloaded(id),
        };
    }

    /// Drop the cached snapshot so the next tick must poll again.
    pub fn refresh(&mut self) {
        if self.is_loaded() {
            *self = LegState::Unloaded(self.id().clone());
        }
    }

    pub fn quantity(&self) -> Option<Decimal> {
        match self {
            LegState::Loaded { snapshot, .. } => Some(snapshot.quantity),
            LegState::Unloaded(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LegState::Loaded { .. })
    }
}

// =============================================================================
// Tracked Position
// =============================================================================

/// An open cross-DEX pair as seen by the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedPosition {
    pub id: Uuid,
    pub symbol: Arc<str>,
    pub long_leg: LegState,
    pub short_leg: LegState,
}

impl TrackedPosition {
    pub fn new(symbol: impl Into<Arc<str>>, long_dex: impl Into<DexId>, short_dex: impl Into<DexId>) -> Self {
        let symbol: Arc<str> = symbol.into();
        Self {
            id: Uuid::new_v4(),
            long_leg: LegState::new(long_dex.into(), symbol.clone()),
            short_leg: LegState::new(short_dex.into(), symbol.clone()),
            symbol,
        }
    }

    pub fn long_dex(&self) -> &DexId {
        &self.long_leg.id().dex
    }

    pub fn short_dex(&self) -> &DexId {
        &self.short_leg.id().dex
    }

    /// Record one poll tick for both legs.
    pub fn load(&mut self, long_quantity: Option<Decimal>, short_quantity: Option<Decimal>) {
        self.long_leg.load(long_quantity);
        self.short_leg.load(short_quantity);
    }

    pub fn refresh(&mut self) {
        self.long_leg.refresh();
        self.short_leg.refresh();
    }

    /// Leg sizes as currently loaded; unloaded legs read as `None`.
    pub fn leg_pair(&self) -> LegPair {
        LegPair::new(self.long_leg.quantity(), self.short_leg.quantity())
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Why a close was requested
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CloseReason {
    Imbalanced { imbalance: Decimal },
}

/// Outcome of one lifecycle check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LifecycleAction {
    /// Legs are within tolerance
    Hold { imbalance: Decimal },
    /// Scheduler should close both legs
    Close { reason: CloseReason },
    /// Legs missing or non-positive; liquidation handling is the caller's job
    Indeterminate,
}

/// Applies the imbalance rule to tracked positions and feeds cooldowns.
#[derive(Debug, Clone)]
pub struct PositionLifecycle {
    detector: PositionImbalanceDetector,
    cooldowns: Arc<CooldownManager>,
}

impl PositionLifecycle {
    pub fn new(detector: PositionImbalanceDetector, cooldowns: Arc<CooldownManager>) -> Self {
        Self {
            detector,
            cooldowns,
        }
    }

    /// Evaluate one position on a poll tick.
    pub fn evaluate(&self, position: &TrackedPosition) -> LifecycleAction {
        let legs = position.leg_pair();
        let Some(imbalance) = self.detector.imbalance_fraction(&legs) else {
            warn!(
                position_id = %position.id,
                symbol = position.symbol.as_ref(),
                long_qty = ?legs.long_quantity,
                short_qty = ?legs.short_quantity,
                "[POSITION] Cannot assess balance"
            );
            return LifecycleAction::Indeterminate;
        };

        if self.detector.is_imbalanced(&legs) {
            warn!(
                position_id = %position.id,
                symbol = position.symbol.as_ref(),
                long = position.long_dex().as_ref(),
                short = position.short_dex().as_ref(),
                imbalance = %imbalance,
                threshold = %self.detector.threshold,
                "[POSITION] Legs out of balance, requesting close"
            );
            self.cooldowns.mark(&position.symbol);
            LifecycleAction::Close {
                reason: CloseReason::Imbalanced { imbalance },
            }
        } else {
            LifecycleAction::Hold { imbalance }
        }
    }

    /// Suppress re-entry after a failed open or close.
    pub fn record_failure(&self, symbol: &str) {
        info!(symbol = symbol, "[POSITION] Trade failed, symbol cooling down");
        self.cooldowns.mark(symbol);
    }
}
