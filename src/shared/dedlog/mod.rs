//! Deduplicated logging for per-update failures on the refresh and callback paths.

pub mod consts;
pub mod log_entry;

#[cfg(test)]
mod log_entry_test;

pub use log_entry::{err, is_running, start_dedup_logger, FlushStats};
