//! Session activity tracking
//!
//! Each log keeps its own tracker. A session is active while it has seen
//! activity inside the activity window and has not been marked completed.
//! Completion is sticky: later traffic refreshes the timestamp but never
//! makes the session active again.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// Tracker membership of one session key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Tracked, not completed, activity inside the window
    Active,
    /// Tracked, not completed, but quiet for longer than the window
    Idle,
    /// Explicitly marked completed
    Completed,
    /// Never seen, or garbage-collected
    Untracked,
}

#[derive(Debug, Clone)]
pub(crate) struct SessionTracker {
    completed: HashSet<String>,
    last_activity: HashMap<String, i64>,
    active_window_ms: i64,
}

impl SessionTracker {
    pub(crate) fn new(active_window_ms: i64) -> Self {
        Self {
            completed: HashSet::new(),
            last_activity: HashMap::new(),
            active_window_ms,
        }
    }

    /// Record activity; runs on every add, completed or not
    pub(crate) fn touch(&mut self, session_key: &str, now: i64) {
        self.last_activity.insert(session_key.to_string(), now);
    }

    /// Returns `true` the first time. A key this tracker never saw gets
    /// `now` as its last activity, so it is kept for the full session age.
    pub(crate) fn mark_completed(&mut self, session_key: &str, now: i64) -> bool {
        self.last_activity
            .entry(session_key.to_string())
            .or_insert(now);
        self.completed.insert(session_key.to_string())
    }

    pub(crate) fn is_completed(&self, session_key: &str) -> bool {
        self.completed.contains(session_key)
    }

    pub(crate) fn is_active(&self, session_key: &str, now: i64) -> bool {
        if self.completed.contains(session_key) {
            return false;
        }
        self.last_activity
            .get(session_key)
            .is_some_and(|&last| now.saturating_sub(last) < self.active_window_ms)
    }

    pub(crate) fn state(&self, session_key: &str, now: i64) -> SessionState {
        if self.completed.contains(session_key) {
            SessionState::Completed
        } else if self.is_active(session_key, now) {
            SessionState::Active
        } else if self.last_activity.contains_key(session_key) {
            SessionState::Idle
        } else {
            SessionState::Untracked
        }
    }

    pub(crate) fn active_count(&self, now: i64) -> usize {
        self.last_activity
            .keys()
            .filter(|key| self.is_active(key, now))
            .count()
    }

    /// Forget completed sessions idle for longer than `max_age_ms`
    pub(crate) fn collect_garbage(&mut self, now: i64, max_age_ms: i64) -> usize {
        let expired: Vec<String> = self
            .completed
            .iter()
            .filter(|key| {
                self.last_activity
                    .get(key.as_str())
                    .map_or(true, |&last| now.saturating_sub(last) > max_age_ms)
            })
            .cloned()
            .collect();

        for key in &expired {
            self.completed.remove(key);
            self.last_activity.remove(key);
        }

        expired.len()
    }
}
