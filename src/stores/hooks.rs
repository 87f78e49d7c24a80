//! Hook event store: indexed by hook name and session key

use crate::event_log::{EventLog, LogRecord};
use crate::types::{HookEvent, HookMetrics};

pub type HookEventLog = EventLog<HookEvent>;

impl LogRecord for HookEvent {
    const KIND: &'static str = "hook";
    const ID_PREFIX: &'static str = "hook";

    fn classification_key(&self) -> &str {
        &self.hook_name
    }

    fn session_key(&self) -> Option<&str> {
        self.session_key.as_deref()
    }
}

pub fn summarize(log: &HookEventLog) -> HookMetrics {
    let stats = log.stats();
    HookMetrics {
        total_events: stats.total_events,
        events_by_hook: stats.events_by_key,
        unique_sessions: stats.unique_sessions,
    }
}
