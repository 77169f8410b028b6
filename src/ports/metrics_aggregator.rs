//! Metrics aggregator port - bounded outcome log and statistics.

use std::collections::HashMap;
use std::time::Duration;

use crate::domain::foundation::RouteId;
use crate::domain::metrics::{LoadBalancerStats, RequestMetric, TargetLoad};
use crate::domain::routing::TargetKey;

/// Shared append target for request outcomes.
///
/// Appends from many threads must neither lose nor duplicate entries, and
/// the retained history never exceeds the configured capacity. Statistics are
/// computed from a snapshot so readers do not hold up writers.
pub trait MetricsAggregator: Send + Sync {
    /// Appends a metric, evicting the oldest when full.
    fn record(&self, metric: RequestMetric);

    /// Statistics over metrics within `window` of now.
    fn compute_stats(&self, window: Duration) -> LoadBalancerStats;

    /// Recent per-target signals for a route's candidates.
    fn target_loads(&self, route_id: &RouteId, targets: &[TargetKey]) -> HashMap<TargetKey, TargetLoad>;

    /// Drops everything recorded for a route.
    fn purge_route(&self, route_id: &RouteId);

    /// Number of retained metrics.
    fn len(&self) -> usize;

    fn capacity(&self) -> usize;
}
