//! Query filters for event logs

use serde::Deserialize;

use super::record::{LogRecord, StoredEvent};

/// Conjunctive filter over one event log
///
/// Every field is optional and an absent field matches everything. The
/// limit is applied last and keeps the most recent matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    /// Classification key: stream, diagnostic type or hook name
    #[serde(default, alias = "stream", alias = "type", alias = "hook")]
    pub key: Option<String>,

    #[serde(default)]
    pub session_key: Option<String>,

    /// Ignored by logs whose events carry no run id
    #[serde(default)]
    pub run_id: Option<String>,

    /// Inclusive lower bound on creation time, Unix milliseconds
    #[serde(default)]
    pub since: Option<i64>,

    #[serde(default)]
    pub limit: Option<usize>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn session(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = Some(session_key.into());
        self
    }

    pub fn run(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn since(mut self, timestamp: i64) -> Self {
        self.since = Some(timestamp);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn matches<E: LogRecord>(&self, stored: &StoredEvent<E>) -> bool {
        if let Some(key) = &self.key {
            if stored.classification_key() != key {
                return false;
            }
        }
        if let Some(session) = &self.session_key {
            if stored.session_key() != Some(session.as_str()) {
                return false;
            }
        }
        if E::HAS_RUN_ID {
            if let Some(run) = &self.run_id {
                if stored.run_id() != Some(run.as_str()) {
                    return false;
                }
            }
        }
        if let Some(since) = self.since {
            if stored.timestamp < since {
                return false;
            }
        }
        true
    }
}

/// Keep the trailing `limit` items; `None` keeps everything
pub(crate) fn most_recent<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        if items.len() > limit {
            items.drain(..items.len() - limit);
        }
    }
    items
}
