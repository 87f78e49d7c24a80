//! Shared application state for HTTP handlers

use std::sync::Arc;

use crate::metrics::MetricsAggregator;
use crate::stores::TelemetryStores;

pub struct AppState {
    pub stores: Arc<TelemetryStores>,
    pub aggregator: Arc<MetricsAggregator>,
}

impl AppState {
    pub fn new(stores: Arc<TelemetryStores>, aggregator: Arc<MetricsAggregator>) -> Self {
        Self { stores, aggregator }
    }
}
