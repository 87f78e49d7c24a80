//! Metrics aggregation and persistence
//!
//! - `MetricsAggregator`: periodic snapshots of all stores, bounded history
//! - `MetricsPersistence`: the history file that survives restarts

mod aggregator;
mod persistence;

pub use aggregator::{AggregatorConfig, AggregatorState, MetricsAggregator};
pub use persistence::{MetricsFile, MetricsPersistence, METRICS_FILE_NAME, METRICS_FILE_VERSION};
