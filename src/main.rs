//! Shortener - A lightweight URL shortener service
//!
//! Maps long URLs to short, unguessable keys with TTL expiry, per-key usage
//! statistics, and a two-tier (cache + durable store) registry.

mod api;
mod config;
mod error;
mod models;
mod registry;
mod store;
mod tasks;

use std::net::SocketAddr;

use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use tasks::spawn_sweep_tasks;

/// Main entry point for the shortener server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the durable store and build the registry
/// 4. Start the background cache and store sweep loops
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shortener=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting shortener server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_sweep={}s, store_sweep={}s, data_dir={}",
        config.server_port,
        config.cache_sweep_interval,
        config.store_sweep_interval,
        config.data_dir.display()
    );

    // Open the durable store and build application state
    let state = AppState::from_config(&config)?;
    info!("Registry initialized");

    // Start the background sweep loops; both observe one shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (cache_sweep, store_sweep) = spawn_sweep_tasks(
        state.registry.clone(),
        config.cache_sweep_interval,
        config.store_sweep_interval,
        shutdown_rx,
    );
    info!("Background sweep loops started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    // Let the sweep loops observe the signal and wind down
    let _ = cache_sweep.await;
    let _ = store_sweep.await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, notifies the sweep loops and allows graceful shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Stop the sweep loops
    let _ = shutdown_tx.send(true);
}
