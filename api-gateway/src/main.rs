//! API gateway binary.
//!
//! This is the node process: it parses `-p/--port`, wires up a
//! [`chain::BlockchainEngine`] backed by flat-file persistence and an HTTP
//! peer broadcaster, loads a wallet if one exists on disk, and serves the
//! HTTP facade described in the routes modules.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio::sync::Mutex;

use chain::{BlockchainEngine, FileChainStore, HttpBroadcaster, MetricsRegistry, Wallet, run_prometheus_http_server};
use config::Cli;
use routes::build_router;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "api_gateway=info,chain=info".to_string()))
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = cli.into_node_config();

    // ---------------------------
    // Metrics
    // ---------------------------

    let metrics = Arc::new(MetricsRegistry::new().map_err(|e| format!("failed to initialise metrics registry: {e}"))?);

    if config.metrics.enabled {
        let metrics_clone = metrics.clone();
        let addr = config.metrics.listen_addr;
        tokio::spawn(async move {
            if let Err(e) = run_prometheus_http_server(metrics_clone, addr).await {
                tracing::error!("metrics HTTP server error: {e}");
            }
        });
        tracing::info!("metrics exporter listening on http://{}/metrics", addr);
    }

    // ---------------------------
    // Wallet
    // ---------------------------

    let mut wallet = Wallet::new();
    match wallet.load_keys(&config.wallet_path()) {
        Ok(()) => tracing::info!(path = %config.wallet_path().display(), "loaded wallet from disk"),
        Err(_) => tracing::info!("no wallet on disk yet; waiting for POST /wallet"),
    }

    // ---------------------------
    // Storage + engine + broadcaster
    // ---------------------------

    let store = FileChainStore::new(config.chain_path());
    let broadcaster = HttpBroadcaster::new(config.broadcast_timeout)
        .map_err(|e| format!("failed to build peer broadcaster: {e}"))?;
    let engine = BlockchainEngine::new(config.consensus.clone(), store, broadcaster, config.initial_peers.clone())
        .with_metrics(Arc::new(metrics.node.clone()));

    let app_state = Arc::new(AppState {
        engine: Mutex::new(engine),
        wallet: Mutex::new(wallet),
        config: config.clone(),
    });

    // ---------------------------
    // HTTP router
    // ---------------------------

    let app = build_router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("node listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("HTTP server error: {e}"))?;

    Ok(())
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
