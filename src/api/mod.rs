//! API module for HTTP endpoints
//!
//! Ingestion, queries and metrics over the telemetry stores.

pub mod http;
pub mod rest;
pub mod state;

pub use http::create_router;
pub use state::AppState;
