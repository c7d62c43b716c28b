// Error definitions for the cache manager

/// Errors reported by the manager and its strategies.
///
/// None of them is fatal: a lookup failure goes back to the caller, the
/// rest only cost a dropped or ignored update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("no cache configured for worker {0:?}")]
    UnknownWorker(String),

    #[error("pending update {key:?} does not route to a configured worker")]
    UnroutableUpdate { key: String },

    #[error("unrecognized callback msgtype {0}")]
    UnrecognizedCallback(i32),

    #[error("callback msgtype {msgtype} carries a malformed payload")]
    MalformedPayload { msgtype: i32, payload: String },
}

impl CacheError {
    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::UnknownWorker(_) => "unknown_worker",
            CacheError::UnroutableUpdate { .. } => "unroutable_update",
            CacheError::UnrecognizedCallback(_) => "unrecognized_callback",
            CacheError::MalformedPayload { .. } => "malformed_payload",
        }
    }
}
