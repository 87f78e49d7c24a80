//! Agent Telemetry
//!
//! Bounded, session-aware storage for the telemetry an agent runtime emits,
//! with periodic metrics aggregation that survives restarts.
//!
//! # Features
//!
//! - **Three stores, one engine**: agent, diagnostic and hook events share a
//!   generic [`EventLog`]
//! - **Session-aware retention**: age and size limits never evict events of
//!   sessions that are still running
//! - **Indexed queries**: by classification key, session, run, time and
//!   most-recent-N
//! - **Metrics history**: rolling snapshots, persisted on shutdown and
//!   reloaded on start
//!
//! # Modules
//!
//! - `event_log`: Generic log, session tracking and retention
//! - `stores`: Agent, diagnostic and hook stores plus cross-store queries
//! - `metrics`: Periodic aggregator and history persistence
//! - `types`: Event payloads, statistics and metrics snapshots
//! - `api`: Axum REST endpoints
//! - `config`: Environment-based configuration
//! - `utils`: Clock and atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_telemetry::{AggregatorConfig, MetricsAggregator, RetentionConfig, TelemetryStores};
//! use agent_telemetry::types::AgentEvent;
//!
//! #[tokio::main]
//! async fn main() {
//!     let stores = Arc::new(TelemetryStores::new(RetentionConfig::default()));
//!     let aggregator = Arc::new(MetricsAggregator::new(stores.clone(), AggregatorConfig::default()));
//!     aggregator.start().await;
//!
//!     stores.agent().add(AgentEvent::new("run-1", 1, "lifecycle", serde_json::json!({})));
//!
//!     aggregator.stop().await;
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod event_log;
pub mod metrics;
pub mod stores;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::Config;
pub use error::{Error, PersistenceError, QueryError, Result};
pub use event_log::{EventLog, EventQuery, LogRecord, RetentionConfig, SessionState, StoredEvent};
pub use metrics::{AggregatorConfig, AggregatorState, MetricsAggregator};
pub use stores::{SessionEvents, StoreStats, TelemetryStores};
pub use types::{AgentEvent, DiagnosticEvent, HookEvent, LogStats, MetricsSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
