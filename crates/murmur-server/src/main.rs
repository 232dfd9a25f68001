//! Chat server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`murmur-config.yaml` plus environment overrides)
//! 2. Initialize structured logging (tracing)
//! 3. Open the message store
//! 4. Create the hub and restore recent history from the store
//! 5. Serve HTTP + `WebSocket` until a shutdown signal

use std::sync::Arc;

use anyhow::Context as _;
use murmur_hub::Hub;
use murmur_server::telemetry::init_tracing;
use murmur_server::{AppState, MurmurConfig, start_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config = MurmurConfig::load().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!("initializing tracing: {e}"))?;
    info!(
        host = config.server.host,
        port = config.server.port,
        history_capacity = config.hub.history_capacity,
        send_buffer = config.hub.send_buffer,
        send_timeout_ms = config.hub.send_timeout_ms,
        store = ?config.store.backend,
        "murmur-server starting"
    );

    // 3. Open the message store.
    let store = config
        .store
        .open()
        .await
        .with_context(|| format!("opening message store {}", config.store.path.display()))?;
    info!(backend = store.name(), "Message store ready");

    // 4. Create the hub.
    let hub = Hub::with_store(config.hub.history_capacity, Arc::new(store))
        .with_send_timeout(config.hub.send_timeout());
    let restored = hub
        .restore_from_store()
        .await
        .context("restoring history")?;
    info!(restored, "Hub ready");

    // 5. Serve.
    let state = Arc::new(
        AppState::new(hub)
            .context("compiling page templates")?
            .with_send_buffer(config.hub.send_buffer),
    );
    start_server(&config.server, state).await?;

    info!("murmur-server shutdown complete");
    Ok(())
}
