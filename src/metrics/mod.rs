//! Metrics facade for the cache manager.
//!
//! Counters go through the `metrics` crate; without an installed recorder
//! every call is a no-op.

pub mod meter;

#[cfg(test)]
mod meter_test;

// Re-export commonly used items
pub use meter::*;
