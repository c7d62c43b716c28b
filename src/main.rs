// Main entrypoint for the workercache service.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use workercache::config::{Config, ConfigTrait};
use workercache::manager::telemetry;
use workercache::parser::feed_lines;
use workercache::shutdown::GracefulShutdown;
use workercache::workers::Refresher;
use workercache::{dedlog, CacheManager};

const CONFIG_PATH: &str = "cfg/workercache.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/workercache.cfg.local.yaml";
const TELEMETRY_EVERY: Duration = Duration::from_secs(5);

/// workercache - per-worker LRU caches fed by asynchronous parser callbacks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,

    /// Read parser callbacks from stdin, one `<msgtype>\t<payload>` per line
    #[arg(long)]
    stdin: bool,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<Config> {
    if let Some(custom_path) = path {
        return Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path));
    }

    match Config::load(PathBuf::from(CONFIG_PATH_LOCAL)) {
        Ok(cfg) => Ok(cfg),
        Err(_) => Config::load(PathBuf::from(CONFIG_PATH))
            .with_context(|| format!("failed to load config from {}", CONFIG_PATH)),
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_deref())
        .unwrap_or("debug");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let result = runtime.block_on(async_main(args));

    // A pending blocking stdin read would otherwise keep the runtime alive
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn async_main(args: Args) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let cfg = load_cfg(args.cfg)?;

    // Logger needs the loaded config
    configure_logger(&cfg);

    info!(
        component = "main",
        event = "config_loaded",
        workers = cfg.workers().len(),
        refresh_interval = ?cfg.refresh_interval(),
        "config loaded"
    );

    // The one manager of this process; everything else gets a handle
    let manager = Arc::new(CacheManager::new(&cfg));

    let graceful = GracefulShutdown::new(shutdown_token.clone(), cfg.shutdown_timeout());

    graceful
        .spawn(dedlog::start_dedup_logger(shutdown_token.clone()))
        .await;

    graceful
        .spawn(telemetry::logger(
            shutdown_token.clone(),
            manager.clone(),
            TELEMETRY_EVERY,
        ))
        .await;

    let refresher = Refresher::new(shutdown_token.clone(), manager.clone());
    graceful.spawn(async move { refresher.run().await }).await;

    if args.stdin {
        let (ctx, manager) = (shutdown_token.clone(), manager.clone());
        graceful
            .spawn(async move {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                feed_lines(ctx, manager, stdin).await;
            })
            .await;
    }

    if let Err(e) = graceful.await_shutdown().await {
        error!(
            component = "main",
            scope = "service",
            event = "graceful_shutdown_failed",
            error = %e,
            "failed to gracefully shut down service"
        );
        return Err(e);
    }

    Ok(())
}
