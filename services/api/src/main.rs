//! CCCD API server
//!
//! Serves CCCD analysis and generation over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Result};
use cccd_api::{api, config, state::AppState};
use cccd_codec::Limits;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to CCCD_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting CCCD API server");
    info!(
        listen_addr = %config.listen_addr,
        rate_limit_per_minute = config.rate_limit_per_minute.get(),
        "Configuration loaded"
    );

    let limits = Limits::default();
    let validation = limits.validate();
    if !validation.valid {
        error!(errors = ?validation.errors, "Configuration validation failed");
        bail!("invalid limits: {}", validation.errors.join("; "));
    }
    for warning in &validation.warnings {
        warn!(%warning, "Configuration warning");
    }

    // Create shutdown channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let state = AppState::new(limits, config.rate_limit_per_minute);
    let app = api::create_router(state.clone());

    // Periodically forget clients whose rate-limit buckets have refilled
    let prune_state = state.clone();
    let mut prune_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    prune_state.prune_rate_limits();
                    debug!(clients = prune_state.tracked_clients(), "Pruned rate-limit buckets");
                }
                _ = prune_shutdown.changed() => break,
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    // Spawn the server with graceful shutdown
    let mut server_handle = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
            .with_graceful_shutdown(async move {
                let mut shutdown_rx = shutdown_rx;
                loop {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
    });

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
        }
    }

    let _ = shutdown_tx.send(true);
    if !server_handle.is_finished() {
        let shutdown_timeout = Duration::from_secs(10);
        if let Err(e) = tokio::time::timeout(shutdown_timeout, server_handle).await {
            warn!(error = %e, "Server did not shut down in time");
        }
    }

    info!("CCCD API server shutdown complete");
    Ok(())
}
