//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::rest::{events, metrics, sessions};
use super::state::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Ingestion + filtered queries
        .route(
            "/api/events/agent",
            get(events::list_agent).post(events::ingest_agent),
        )
        .route(
            "/api/events/diagnostic",
            get(events::list_diagnostic).post(events::ingest_diagnostic),
        )
        .route(
            "/api/events/hook",
            get(events::list_hook).post(events::ingest_hook),
        )
        // Session / run scoped
        .route("/api/sessions/events", get(sessions::session_events))
        .route("/api/sessions/:key/complete", post(sessions::complete_session))
        .route("/api/runs/events", get(sessions::run_events))
        // Stats and metrics
        .route("/api/stats", get(metrics::get_stats))
        .route("/api/metrics/latest", get(metrics::latest_metrics))
        .route("/api/metrics/history", get(metrics::metrics_history))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
