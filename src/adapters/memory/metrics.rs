//! Ring-buffer metrics aggregator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::foundation::RouteId;
use crate::domain::metrics::{LoadBalancerStats, RequestMetric, RingBuffer, SampleWindow, TargetLoad};
use crate::domain::routing::TargetKey;
use crate::ports::{Clock, MetricsAggregator};

struct Inner {
    history: RingBuffer<RequestMetric>,
    live: HashMap<(RouteId, TargetKey), SampleWindow>,
}

/// Metrics aggregator over a fixed-capacity ring.
///
/// A single mutex guards append and eviction. `compute_stats` copies the ring
/// under the lock and sorts outside it.
pub struct RingBufferMetricsAggregator {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    latency_window: Duration,
}

impl RingBufferMetricsAggregator {
    /// `latency_window` bounds how old a sample may be to count towards the
    /// live per-target signals.
    pub fn new(capacity: usize, latency_window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                history: RingBuffer::with_capacity(capacity),
                live: HashMap::new(),
            }),
            clock,
            latency_window,
        }
    }

    /// Copy of the retained history, oldest first.
    pub fn snapshot(&self) -> Vec<RequestMetric> {
        self.lock().history.snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsAggregator for RingBufferMetricsAggregator {
    fn record(&self, metric: RequestMetric) {
        let mut inner = self.lock();
        inner
            .live
            .entry((metric.route_id, metric.target_key()))
            .or_default()
            .record(metric.timestamp, metric.response_time_ms, metric.is_error);
        inner.history.push(metric);
    }

    fn compute_stats(&self, window: Duration) -> LoadBalancerStats {
        let snapshot = self.snapshot();
        LoadBalancerStats::compute(&snapshot, window, self.clock.now())
    }

    fn target_loads(&self, route_id: &RouteId, targets: &[TargetKey]) -> HashMap<TargetKey, TargetLoad> {
        let now = self.clock.now();
        let inner = self.lock();
        targets
            .iter()
            .filter_map(|key| {
                inner
                    .live
                    .get(&(*route_id, key.clone()))
                    .map(|window| (key.clone(), window.load(now, self.latency_window)))
            })
            .collect()
    }

    fn purge_route(&self, route_id: &RouteId) {
        let mut inner = self.lock();
        inner.history.retain(|m| m.route_id != *route_id);
        inner.live.retain(|(id, _), _| id != route_id);
    }

    fn len(&self) -> usize {
        self.lock().history.len()
    }

    fn capacity(&self) -> usize {
        self.lock().history.capacity()
    }
}
