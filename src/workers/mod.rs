// Background workers for the cache manager.

pub mod refresher;

// Re-export main types
pub use refresher::Refresher;
