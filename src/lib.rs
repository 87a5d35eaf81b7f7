//! Funding Rate Arbitrage - Opportunity Detection Engine
//!
//! Scans perpetual DEX funding rates for delta-neutral carry trades:
//! - Funding sources (file, HTTP, in-memory) with symbol canonicalization
//! - Rate normalization across funding intervals and fee-aware pricing
//! - Ranked, filtered opportunities with per-symbol cooldowns
//! - Leg-balance checks for open positions

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;

pub use error::AppError;
