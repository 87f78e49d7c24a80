//! Data types for the telemetry service
//!
//! Ingested event payloads, store statistics, and aggregated metrics.

mod event;
mod metrics;
mod stats;

pub use event::{AgentEvent, DiagnosticEvent, HookEvent};
pub use metrics::{AgentMetrics, DiagnosticMetrics, HeartbeatMetrics, HookMetrics, MetricsSnapshot};
pub use stats::LogStats;
