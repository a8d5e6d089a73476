mod error;
mod logging;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use shiptrack::config::{default_config_path, load_config, Config};
use shiptrack::{IngestPipeline, TrackingBroadcaster};
use tracing::{info, warn};

use state::AppState;

/// Overrides the config path when no CLI argument is given.
const CONFIG_ENV: &str = "SHIPTRACK_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging()?;

    info!("Starting shiptrack-server v{}", env!("CARGO_PKG_VERSION"));

    let config = load_startup_config()?;

    if let Some(db_path) = config.database_path() {
        info!("Using database at {:?}", db_path);
    }
    let broadcaster = TrackingBroadcaster::new(config.broadcast_capacity);
    let pipeline = IngestPipeline::open(&config, Arc::new(broadcaster.clone()))
        .context("Failed to initialize ingestion pipeline")?;

    let webhook_secret = config
        .webhook_secret()
        .context("Failed to resolve webhook secret")?;
    if webhook_secret.is_none() {
        warn!("No webhook secret configured; inbound signatures will not be verified");
    }

    let state = Arc::new(AppState::new(
        pipeline,
        broadcaster,
        webhook_secret,
        &config.webhook.signature_header,
        &config.default_workspace_id,
    ));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Loads the config from the first CLI argument, `SHIPTRACK_CONFIG`, or the
/// default location. Only a missing default file falls back to built-in
/// defaults; an explicitly named file must exist.
fn load_startup_config() -> anyhow::Result<Config> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    if let Some(path) = explicit {
        info!("Loading config from {:?}", path);
        return load_config(&path).with_context(|| format!("Failed to load config {:?}", path));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading config from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config {:?}", path))
        }
        _ => {
            warn!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
