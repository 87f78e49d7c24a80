//! Periodic metrics aggregation
//!
//! ```text
//! Stopped ──start()──► Starting ──► Running ──stop()──► Stopping ──► Stopped
//!             │ load history          │ tick every interval   │ cancel worker,
//!             │ aggregate once        │ append snapshot       │ then persist
//! ```
//!
//! A single worker task owns the interval, so passes never overlap. `stop`
//! waits for that task to exit before writing the history, so no tick can
//! land after the final save.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::PersistenceError;
use crate::stores::TelemetryStores;
use crate::types::MetricsSnapshot;
use crate::utils::{system_clock, SharedClock};

use super::persistence::MetricsPersistence;

/// Lifecycle of the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatorState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Configuration for the MetricsAggregator
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Time between aggregation passes
    pub interval: Duration,
    /// Snapshots kept in memory and on disk
    pub max_history: usize,
    /// History file; `None` keeps history in memory only
    pub state_path: Option<PathBuf>,
    /// Upper bound on a single load or save
    pub io_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_history: 1440,
            state_path: None,
            io_timeout: Duration::from_secs(10),
        }
    }
}

struct History {
    snapshots: VecDeque<MetricsSnapshot>,
    max_len: usize,
}

impl History {
    fn push(&mut self, snapshot: MetricsSnapshot) {
        self.snapshots.push_back(snapshot);
        self.truncate();
    }

    fn truncate(&mut self) {
        while self.snapshots.len() > self.max_len {
            self.snapshots.pop_front();
        }
    }
}

struct Worker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Builds periodic snapshots of the stores and keeps a bounded history
pub struct MetricsAggregator {
    stores: Arc<TelemetryStores>,
    interval: Duration,
    io_timeout: Duration,
    persistence: Option<MetricsPersistence>,
    clock: SharedClock,
    state: Mutex<AggregatorState>,
    history: RwLock<History>,
    worker: Mutex<Option<Worker>>,
}

impl MetricsAggregator {
    pub fn new(stores: Arc<TelemetryStores>, config: AggregatorConfig) -> Self {
        Self::with_clock(stores, config, system_clock())
    }

    pub fn with_clock(
        stores: Arc<TelemetryStores>,
        config: AggregatorConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            stores,
            interval: config.interval,
            io_timeout: config.io_timeout,
            persistence: config.state_path.map(MetricsPersistence::new),
            clock,
            state: Mutex::new(AggregatorState::Stopped),
            history: RwLock::new(History {
                snapshots: VecDeque::new(),
                max_len: config.max_history,
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> AggregatorState {
        *self.state.lock()
    }

    /// Load saved history, aggregate once, then start the periodic worker.
    ///
    /// Does nothing unless the aggregator is stopped.
    pub async fn start(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if *state != AggregatorState::Stopped {
                warn!(state = ?*state, "Metrics aggregator already started");
                return;
            }
            *state = AggregatorState::Starting;
        }

        let loaded = self.load_history().await;
        if !loaded.is_empty() {
            // Saved snapshots are older than anything taken before start
            let mut history = self.history.write();
            let mut merged: VecDeque<MetricsSnapshot> = loaded.into();
            merged.append(&mut history.snapshots);
            history.snapshots = merged;
            history.truncate();
        }

        self.aggregate_now();

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(Arc::clone(self).run(shutdown_rx));
        *self.worker.lock() = Some(Worker { shutdown, handle });

        *self.state.lock() = AggregatorState::Running;
        info!(
            interval_secs = self.interval.as_secs(),
            history = self.history.read().snapshots.len(),
            "Metrics aggregator started"
        );
    }

    /// Cancel the periodic worker, wait for it, then persist the history.
    ///
    /// Persistence failures are logged, never returned.
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock();
            if *state != AggregatorState::Running {
                return;
            }
            *state = AggregatorState::Stopping;
        }

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.shutdown.send(());
            if let Err(e) = worker.handle.await {
                warn!(error = %e, "Metrics worker ended abnormally");
            }
        }

        self.persist_history().await;

        *self.state.lock() = AggregatorState::Stopped;
        info!("Metrics aggregator stopped");
    }

    async fn run(self: Arc<Self>, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.aggregate_now();
                }
            }
        }
    }

    /// Run one aggregation pass and append it to the history
    pub fn aggregate_now(&self) -> MetricsSnapshot {
        let snapshot = self.stores.snapshot();
        debug!(
            agent_events = snapshot.agent.total_events,
            diagnostic_events = snapshot.diagnostics.total_events,
            hook_events = snapshot.hooks.total_events,
            "Aggregated metrics"
        );
        self.history.write().push(snapshot.clone());
        snapshot
    }

    pub fn latest_metrics(&self) -> Option<MetricsSnapshot> {
        self.history.read().snapshots.back().cloned()
    }

    /// Most recent `limit` snapshots, oldest first
    pub fn metrics_history(&self, limit: Option<usize>) -> Vec<MetricsSnapshot> {
        let history = self.history.read();
        let skip = limit.map_or(0, |limit| history.snapshots.len().saturating_sub(limit));
        history.snapshots.iter().skip(skip).cloned().collect()
    }

    pub fn max_history(&self) -> usize {
        self.history.read().max_len
    }

    /// Change the history cap; the oldest excess snapshots are dropped now
    pub fn set_max_history(&self, max_history: usize) {
        let mut history = self.history.write();
        history.max_len = max_history;
        history.truncate();
    }

    async fn load_history(&self) -> Vec<MetricsSnapshot> {
        let Some(persistence) = self.persistence.clone() else {
            return Vec::new();
        };

        match run_blocking(self.io_timeout, move || persistence.load()).await {
            Ok(history) => {
                if !history.is_empty() {
                    info!(snapshots = history.len(), "Loaded metrics history");
                }
                history
            }
            Err(e) => {
                warn!(error = %e, "Failed to load metrics history, starting empty");
                Vec::new()
            }
        }
    }

    async fn persist_history(&self) {
        let Some(persistence) = self.persistence.clone() else {
            return;
        };

        let history = self.metrics_history(None);
        let saved_at = self.clock.now_millis();
        let count = history.len();
        let path = persistence.path().display().to_string();

        match run_blocking(self.io_timeout, move || persistence.save(&history, saved_at)).await {
            Ok(()) => info!(snapshots = count, path = %path, "Saved metrics history"),
            Err(e) => warn!(error = %e, path = %path, "Failed to save metrics history"),
        }
    }
}

/// Run blocking file I/O off the runtime threads, bounded by `timeout`
async fn run_blocking<T, F>(timeout: Duration, f: F) -> Result<T, PersistenceError>
where
    F: FnOnce() -> Result<T, PersistenceError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(PersistenceError::Task(e.to_string())),
        Err(_) => Err(PersistenceError::Timeout(timeout)),
    }
}
