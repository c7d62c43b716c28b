//! Periodic refresh worker.

pub mod refresher;


// Re-export main types
pub use refresher::{Refresher, SVC_REFRESHER};
