//! Chaosmeter server binary.
//!
//! Wires the engine, persistence, and background loops together and
//! serves the HTTP API plus the dashboard page.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use chaos_engine::{
    default_config_toml, Clock, EngineConfig, EventLog, FileLockStore, RollupStore, SharedSource,
};
use chaos_server::tasks::{indexer_loop, rollup_loop, IndexerClient};
use chaos_server::{routes, AppState};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the chaosmeter server
#[derive(Parser, Debug)]
#[command(name = "chaosmeter")]
#[command(about = "House chaos metrics service")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a default configuration file to this path and exit
    #[arg(long)]
    write_default_config: Option<PathBuf>,

    /// Base URL of the external message indexer (optional)
    #[arg(long)]
    indexer_url: Option<String>,

    /// Seconds between hourly-rollup persistence passes
    #[arg(long, default_value_t = 300)]
    rollup_interval_secs: u64,

    /// Seconds between indexer refresh passes
    #[arg(long, default_value_t = 5)]
    refresh_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        if let Err(e) = std::fs::write(path, default_config_toml()) {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            process::exit(1);
        }
        tracing::info!("Wrote default configuration to {}", path.display());
        return;
    }

    let config = match &args.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load config {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let log = match EventLog::open(&config.storage.event_log) {
        Ok(log) => log,
        Err(e) => {
            tracing::error!(
                "Failed to open event log {}: {}",
                config.storage.event_log.display(),
                e
            );
            process::exit(1);
        }
    };
    tracing::info!("Event log at {}", config.storage.event_log.display());

    let rollups = RollupStore::load(&config.storage.rollups);
    tracing::info!(
        "Rollup store at {} ({} hours)",
        config.storage.rollups.display(),
        rollups.len()
    );

    let lock = Arc::new(FileLockStore::new(config.storage.lock_file.clone()));
    let source = Arc::new(SharedSource::new(
        chrono::Duration::seconds(config.cache.counts_ttl_secs as i64),
        chrono::Duration::seconds(config.cache.pizza_ttl_secs as i64),
    ));

    let state = AppState::new(
        &config,
        source.clone(),
        lock,
        log,
        rollups,
        Clock::System,
    );

    tokio::spawn(rollup_loop(
        state.clone(),
        Duration::from_secs(args.rollup_interval_secs),
    ));

    if let Some(base_url) = &args.indexer_url {
        match IndexerClient::new(base_url.clone(), Duration::from_secs(3)) {
            Ok(client) => {
                tracing::info!("Indexer refresher polling {}", base_url);
                tokio::spawn(indexer_loop(
                    client,
                    source,
                    Clock::System,
                    Duration::from_secs(args.refresh_interval_secs),
                ));
            }
            Err(e) => {
                tracing::warn!("Indexer client unavailable, using fallback counts: {}", e);
            }
        }
    } else {
        tracing::info!("No indexer configured, scoring from local windows");
    }

    tracing::info!("Chaosmeter listening on port {}", args.port);
    warp::serve(routes(state)).run(([0, 0, 0, 0], args.port)).await;
}
