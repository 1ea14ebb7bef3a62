//! Varied Sizes - sizing service for an out-of-process simulation host
//!
//! The host advances the tick counter and asks for sizes over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use varied_sizes::api::{create_router, AppState};
use varied_sizes::persistence;
use varied_sizes::tasks::spawn_maintenance_task;
use varied_sizes::Config;

/// Main entry point for the sizing service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables and size settings
/// 3. Create the sizing engine and restore the saved size table
/// 4. Start background maintenance task
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, stop maintenance and save the size table once more
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "varied_sizes=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Varied Sizes service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, scalar_ttl={} ticks, mesh_ttl={} ticks, maintenance_interval={}s",
        config.server_port,
        config.scalar_ttl_ticks,
        config.mesh_ttl_ticks,
        config.maintenance_interval
    );

    let settings = config
        .load_settings()
        .context("failed to load size settings")?;
    let state = AppState::from_config(&config, settings);

    if let Some(path) = &config.assignments_path {
        let loaded = persistence::load_from_path(path)
            .with_context(|| format!("failed to load size table from {}", path.display()))?;
        if let Some(snapshot) = loaded {
            let restored = state.engine.write().await.policy.restore(snapshot);
            info!("Restored {} size assignments", restored);
        }
    }

    let maintenance_handle = spawn_maintenance_task(
        state.engine.clone(),
        config.maintenance_interval,
        config.assignments_path.clone(),
    );
    info!("Background maintenance task started");

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(maintenance_handle))
        .await
        .context("server error")?;

    if let Some(path) = &config.assignments_path {
        let snapshot = state.engine.read().await.policy.snapshot();
        persistence::save_to_path(&snapshot, path)
            .with_context(|| format!("failed to save size table to {}", path.display()))?;
        info!("Saved {} size assignments", snapshot.len());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the maintenance task and allows graceful shutdown.
async fn shutdown_signal(maintenance_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
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

    maintenance_handle.abort();
    warn!("Maintenance task aborted");
}
