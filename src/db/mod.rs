//! Cache storage: per-worker LRU caches and the pending update queue.

pub mod lru;
pub mod queue;

#[cfg(test)]
mod queue_test;

// Re-export main types
pub use lru::LruCache;
pub use queue::{PendingUpdate, PendingUpdateQueue};
