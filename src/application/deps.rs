//! Collaborators shared by the routing handlers.

use std::sync::Arc;

use super::health_board::HealthBoard;
use crate::adapters::{
    InMemoryCircuitBreakerManager, InMemoryRateLimiter, InMemoryRouteRegistry,
    RingBufferMetricsAggregator, TracingEventSink,
};
use crate::config::RouterConfig;
use crate::domain::selection::{AdaptiveScorer, InFlightTracker, TargetSelector, WeightedScorer};
use crate::ports::{
    CircuitBreakerManager, Clock, HealthChecker, MetricsAggregator, RateLimiter, RouteRegistry,
    RoutingEventSink,
};

/// Every component the router composes, built once at startup.
///
/// Cloning shares the underlying components.
#[derive(Clone)]
pub struct RouterDeps {
    pub registry: Arc<dyn RouteRegistry>,
    pub breakers: Arc<dyn CircuitBreakerManager>,
    pub metrics: Arc<dyn MetricsAggregator>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub health_checker: Arc<dyn HealthChecker>,
    pub events: Arc<dyn RoutingEventSink>,
    pub clock: Arc<dyn Clock>,
    pub selector: Arc<TargetSelector>,
    pub in_flight: Arc<InFlightTracker>,
    pub health_board: Arc<HealthBoard>,
}

impl RouterDeps {
    /// In-process components sized from `config`. Events go to the log.
    pub fn in_memory(
        config: &RouterConfig,
        health_checker: Arc<dyn HealthChecker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let metrics = RingBufferMetricsAggregator::new(
            config.metrics_capacity,
            config.latency_window(),
            Arc::clone(&clock),
        );
        Self {
            registry: Arc::new(InMemoryRouteRegistry::new()),
            breakers: Arc::new(InMemoryCircuitBreakerManager::new()),
            metrics: Arc::new(metrics),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(Arc::clone(&clock))),
            health_checker,
            events: Arc::new(TracingEventSink),
            clock,
            selector: Arc::new(TargetSelector::new(Arc::new(WeightedScorer::new(
                config.adaptive,
            )))),
            in_flight: Arc::new(InFlightTracker::new()),
            health_board: Arc::new(HealthBoard::new()),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn RoutingEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Replaces the adaptive scoring formula.
    pub fn with_scorer(mut self, scorer: Arc<dyn AdaptiveScorer>) -> Self {
        self.selector = Arc::new(TargetSelector::new(scorer));
        self
    }
}
