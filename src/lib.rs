#[path = "shared/dedlog/mod.rs"]
pub mod dedlog;

pub mod config;
pub mod db;
pub mod manager;
pub mod metrics;
pub mod parser;
pub mod routing;
pub mod shutdown;
pub mod workers;

pub use manager::{CacheError, CacheManager, RefreshOutcome, RefreshReport};

#[cfg(test)]
mod tests;
