//! Per-worker cache manager.

pub mod counters;
pub mod error;
pub mod manager;
pub mod telemetry;


// Re-export main types
pub use counters::{Counters, CountersSnapshot};
pub use error::CacheError;
pub use manager::{CacheManager, CacheStats, RefreshOutcome, RefreshReport};
