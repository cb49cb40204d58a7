// =============================================================================
// stock-nexus — Main Entry Point
// =============================================================================
//
// Loads every dataset once (prices are enriched with MA/RSI indicators at this
// point), then serves them read-only over HTTP until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod config;
mod engine;
mod error;
mod indicators;
mod loader;
mod market_data;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::Settings;

const DEFAULT_CONFIG_PATH: &str = "stock_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("stock-nexus starting up");

    // ── 2. Settings ──────────────────────────────────────────────────────
    let config_path =
        std::env::var("STOCK_NEXUS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut settings = Settings::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load settings file, using defaults");
        Settings::default()
    });
    settings.apply_env();

    info!(
        data_file = ?settings.data_file_path,
        bind_addr = %settings.bind_addr,
        "Configured data sources"
    );

    // ── 3. Load datasets (one-time, before serving) ──────────────────────
    let state = Arc::new(AppState::build(settings)?);

    // ── 4. Start the API server ──────────────────────────────────────────
    let bind_addr = state.settings.bind_addr.clone();
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("stock-nexus shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
