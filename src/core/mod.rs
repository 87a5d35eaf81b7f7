//! Core module - Rate normalization, fees, opportunity finding, cooldowns, position balance
//!
//! This module uses **explicit re-exports** instead of glob exports (`pub use module::*`)
//! to provide better API visibility and prevent accidental public API changes.
//!
//! ## Usage
//! Prefer importing from `crate::core`:
//! ```ignore
//! use crate::core::{OpportunityFinder, OpportunityFilters, ScanContext};
//! ```
//!
//! ## Adding New Public Types
//! When adding new public types to submodules, explicitly add them to the
//! re-exports below to make them part of the public API.

pub mod context;
pub mod cooldown;
pub mod errors;
pub mod fees;
pub mod finder;
pub mod imbalance;
pub mod lifecycle;
pub mod rate;
pub mod types;

// Explicit re-exports for types module
pub use types::{
    current_time_ms, DexId, FeeStructure, FeeTable, FundingQuote, LegPair, Opportunity,
    RawFundingQuote, SECONDS_PER_YEAR,
};

// Explicit re-exports for errors module
pub use errors::{EngineError, EngineResult};

// Explicit re-exports for rate module
pub use rate::{normalize, per_interval, SECONDS_PER_HOUR};

// Explicit re-exports for fees module
pub use fees::{flag_unconventional, round_trip_cost, total_arbitrage_cost, MAX_FEE_FRACTION};

// Explicit re-exports for finder module
pub use finder::{
    validate_horizon, FiltersBuilder, OpportunityFilters, OpportunityFinder, SortKey,
    DEFAULT_LIMIT,
};

// Explicit re-exports for cooldown module
pub use cooldown::{Clock, CooldownManager, ManualClock, SystemClock};

// Explicit re-exports for imbalance module
pub use imbalance::{
    imbalance_fraction, is_imbalanced, PositionImbalanceDetector, DEFAULT_IMBALANCE_THRESHOLD,
};

// Explicit re-exports for lifecycle module
pub use lifecycle::{
    CloseReason, LegId, LegSnapshot, LegState, LifecycleAction, PositionLifecycle,
    TrackedPosition,
};

// Explicit re-exports for context module
pub use context::ScanContext;
