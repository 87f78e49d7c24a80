//! Store statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Point-in-time statistics for one event log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    /// Events currently retained
    pub total_events: usize,
    /// Retained events per classification key
    pub events_by_key: BTreeMap<String, usize>,
    /// Distinct session keys among retained events
    pub unique_sessions: usize,
    /// Sessions passing the activity check right now
    pub active_sessions: usize,
    /// Creation time of the oldest retained event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_timestamp: Option<i64>,
    /// Creation time of the newest retained event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_timestamp: Option<i64>,
}

impl LogStats {
    /// Count for a single classification key
    pub fn count_for(&self, key: &str) -> usize {
        self.events_by_key.get(key).copied().unwrap_or(0)
    }
}
