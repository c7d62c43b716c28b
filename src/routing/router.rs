// Routing of pending update keys to per-worker caches.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{Routing, RoutingMode};

/// Destination of a pending update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Worker whose cache receives the update.
    pub worker: String,
    /// Key stored in that cache.
    pub key: String,
}

/// Strategy mapping an update key to a worker cache.
///
/// Implementations run inside the refresh cycle and must not block.
pub trait KeyRouter: Send + Sync {
    fn route(&self, key: &str) -> Option<Route>;
}

/// Routes `<worker><sep><key>` to `worker`, storing `<key>`.
#[derive(Debug, Clone)]
pub struct PrefixRouter {
    separator: String,
}

impl PrefixRouter {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl KeyRouter for PrefixRouter {
    fn route(&self, key: &str) -> Option<Route> {
        let (worker, rest) = key.split_once(self.separator.as_str())?;
        if worker.is_empty() || rest.is_empty() {
            return None;
        }
        Some(Route {
            worker: worker.to_string(),
            key: rest.to_string(),
        })
    }
}

/// Routes through a fixed key -> worker table; the key is stored as is.
#[derive(Debug, Clone, Default)]
pub struct TableRouter {
    table: HashMap<String, String>,
}

impl TableRouter {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table }
    }
}

impl KeyRouter for TableRouter {
    fn route(&self, key: &str) -> Option<Route> {
        self.table.get(key).map(|worker| Route {
            worker: worker.clone(),
            key: key.to_string(),
        })
    }
}

/// Builds the router selected by configuration.
pub fn new_router(cfg: &Routing) -> Arc<dyn KeyRouter> {
    match cfg.mode {
        RoutingMode::Prefix => Arc::new(PrefixRouter::new(cfg.separator.clone())),
        RoutingMode::Table => Arc::new(TableRouter::new(cfg.table.clone())),
    }
}
