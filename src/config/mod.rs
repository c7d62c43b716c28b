// Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

pub const PROD: &str = "prod";
#[allow(dead_code)]
pub const DEV: &str = "dev";
#[allow(dead_code)]
pub const TEST: &str = "test";

pub const DEFAULT_PAYLOAD_SEPARATOR: &str = "\t";
pub const DEFAULT_ROUTING_SEPARATOR: &str = ":";
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerCache {
    #[serde(rename = "workercache")]
    pub cache: CacheBox,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheBox {
    pub env: String,
    pub logs: Option<Logs>,
    pub runtime: Option<Runtime>,
    pub workers: Vec<Worker>,
    pub refresh: Refresh,
    #[serde(default)]
    pub callbacks: Callbacks,
    #[serde(default)]
    pub routing: Routing,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logs {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Runtime {
    #[serde(rename = "shutdown_timeout", default, with = "humantime_serde")]
    pub shutdown_timeout: Option<Duration>,
}

/// One named cache and its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Worker {
    pub name: String,
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Refresh {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Callbacks {
    /// Message types whose payload carries a cache update.
    #[serde(rename = "update_types", default)]
    pub update_types: Vec<i32>,
    #[serde(default = "default_payload_separator")]
    pub separator: String,
}

impl Default for Callbacks {
    fn default() -> Self {
        Self {
            update_types: Vec::new(),
            separator: default_payload_separator(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    Prefix,
    Table,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Routing {
    pub mode: RoutingMode,
    #[serde(default = "default_routing_separator")]
    pub separator: String,
    /// Full key -> worker name, used in table mode.
    #[serde(default)]
    pub table: HashMap<String, String>,
}

impl Default for Routing {
    fn default() -> Self {
        Self {
            mode: RoutingMode::Prefix,
            separator: default_routing_separator(),
            table: HashMap::new(),
        }
    }
}

fn default_payload_separator() -> String {
    DEFAULT_PAYLOAD_SEPARATOR.to_string()
}

fn default_routing_separator() -> String {
    DEFAULT_ROUTING_SEPARATOR.to_string()
}

// Config trait
pub trait ConfigTrait {
    fn logs(&self) -> Option<&Logs>;
    fn is_prod(&self) -> bool;
    #[allow(dead_code)]
    fn is_test(&self) -> bool;
    fn workers(&self) -> &[Worker];
    fn refresh_interval(&self) -> Duration;
    fn callbacks(&self) -> &Callbacks;
    fn routing(&self) -> &Routing;
    fn shutdown_timeout(&self) -> Duration;
}

// Config type alias for convenience
pub type Config = WorkerCache;

impl ConfigTrait for Config {
    fn logs(&self) -> Option<&Logs> {
        self.cache.logs.as_ref()
    }

    fn is_prod(&self) -> bool {
        self.cache.env == PROD
    }

    fn is_test(&self) -> bool {
        self.cache.env == TEST
    }

    fn workers(&self) -> &[Worker] {
        &self.cache.workers
    }

    fn refresh_interval(&self) -> Duration {
        self.cache.refresh.interval
    }

    fn callbacks(&self) -> &Callbacks {
        &self.cache.callbacks
    }

    fn routing(&self) -> &Routing {
        &self.cache.routing
    }

    fn shutdown_timeout(&self) -> Duration {
        self.cache
            .runtime
            .as_ref()
            .and_then(|r| r.shutdown_timeout)
            .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT)
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Resolve absolute path
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        Self::from_yaml_str(&data).with_context(|| format!("load config from {:?}", abs_path))
    }

    /// Parses and validates configuration from YAML text.
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(data).context("unmarshal yaml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks the invariants the manager relies on.
    pub fn validate(&self) -> Result<()> {
        let workers = &self.cache.workers;
        if workers.is_empty() {
            anyhow::bail!("no workers configured");
        }

        let mut names = HashSet::with_capacity(workers.len());
        for worker in workers {
            if worker.name.is_empty() {
                anyhow::bail!("worker name must not be empty");
            }
            if worker.capacity == 0 {
                anyhow::bail!("worker {:?} has zero capacity", worker.name);
            }
            if !names.insert(worker.name.as_str()) {
                anyhow::bail!("duplicate worker name {:?}", worker.name);
            }
        }

        if self.cache.refresh.interval.is_zero() {
            anyhow::bail!("refresh.interval must be greater than zero");
        }

        if self.cache.callbacks.update_types.is_empty() {
            anyhow::bail!("callbacks.update_types must list at least one msgtype");
        }

        if self.cache.callbacks.separator.is_empty() {
            anyhow::bail!("callbacks.separator must not be empty");
        }

        let routing = &self.cache.routing;
        match routing.mode {
            RoutingMode::Prefix => {
                if routing.separator.is_empty() {
                    anyhow::bail!("routing.separator must not be empty in prefix mode");
                }
            }
            RoutingMode::Table => {
                for (key, worker) in &routing.table {
                    if !names.contains(worker.as_str()) {
                        anyhow::bail!("routing.table key {:?} targets unknown worker {:?}", key, worker);
                    }
                }
            }
        }

        Ok(())
    }
}

// Test config is always available for integration tests
mod test_config;
#[allow(dead_code)]
pub use test_config::{new_test_config, TEST_UPDATE_MSGTYPE};
