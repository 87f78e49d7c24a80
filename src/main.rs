//! Telemetry Server - Binary Entry Point
//!
//! Serves the telemetry stores over HTTP and runs the metrics aggregator
//! until Ctrl+C / SIGTERM.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agent_telemetry::api::{create_router, AppState};
use agent_telemetry::{Config, MetricsAggregator, TelemetryStores};

#[tokio::main]
async fn main() -> agent_telemetry::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = Config::from_env()?;

    let stores = Arc::new(TelemetryStores::new(config.retention.clone()));
    let aggregator = Arc::new(MetricsAggregator::new(
        Arc::clone(&stores),
        config.aggregator.clone(),
    ));
    aggregator.start().await;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    let app = create_router(Arc::new(AppState::new(stores, Arc::clone(&aggregator))));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        state_dir = %config.state_dir.display(),
        "Telemetry server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("Shutdown requested");
        })
        .await?;

    aggregator.stop().await;

    Ok(())
}
