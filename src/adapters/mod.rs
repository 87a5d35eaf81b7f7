//! Funding rate sources
//!
//! This module provides the collection side of the scanner: the
//! `FundingRateSource` abstraction, file/HTTP/in-memory implementations,
//! symbol canonicalization, and the concurrent snapshot collector.

pub mod collector;
pub mod errors;
pub mod http;
pub mod memory;
pub mod snapshot;
pub mod symbols;
pub mod traits;

// Re-export commonly used types for convenience
pub use collector::{collect_quotes, sources_from_config, RateSnapshot, SharedSource};
pub use errors::{SourceError, SourceResult};
pub use http::HttpSnapshotSource;
pub use memory::InMemorySource;
pub use snapshot::{parse_snapshot, FileSnapshotSource};
pub use symbols::canonical_symbol;
pub use traits::FundingRateSource;
