//! Aggregated metrics snapshots
//!
//! Snapshots hold pre-aggregated scalars only. They are what the aggregator
//! keeps in its history and what survives restarts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One aggregation pass over all three stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// When the pass ran, Unix milliseconds
    pub timestamp: i64,
    pub agent: AgentMetrics,
    pub diagnostics: DiagnosticMetrics,
    pub hooks: HookMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub total_events: usize,
    pub events_by_stream: BTreeMap<String, usize>,
    pub unique_runs: usize,
    pub unique_sessions: usize,
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticMetrics {
    pub total_events: usize,
    pub events_by_type: BTreeMap<String, usize>,
    pub heartbeat: HeartbeatMetrics,
}

/// Heartbeat health derived from retained diagnostic events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatMetrics {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// `successes / total`; absent when no heartbeats are retained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    /// Failures since the most recent success
    pub consecutive_failures: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookMetrics {
    pub total_events: usize,
    pub events_by_hook: BTreeMap<String, usize>,
    pub unique_sessions: usize,
}
