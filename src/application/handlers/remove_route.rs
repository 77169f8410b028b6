//! RemoveRouteHandler - unregisters a route and drops its state.

use std::sync::Arc;

use crate::domain::foundation::RouteId;
use crate::domain::routing::Route;
use crate::domain::selection::TargetSelector;
use crate::ports::{CircuitBreakerManager, MetricsAggregator, RateLimiter, RouteRegistry};

/// Command to remove a route.
#[derive(Debug, Clone, Copy)]
pub struct RemoveRouteCommand {
    pub route_id: RouteId,
}

/// Handler for route removal.
///
/// Purges the route's metrics, breaker, round-robin cursor and rate-limit
/// bucket. In-flight counters and health records belong to endpoints and
/// are kept. Removing an absent route is a no-op that still sweeps any
/// state a racing request left behind.
pub struct RemoveRouteHandler {
    registry: Arc<dyn RouteRegistry>,
    breakers: Arc<dyn CircuitBreakerManager>,
    metrics: Arc<dyn MetricsAggregator>,
    rate_limiter: Arc<dyn RateLimiter>,
    selector: Arc<TargetSelector>,
}

impl RemoveRouteHandler {
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        breakers: Arc<dyn CircuitBreakerManager>,
        metrics: Arc<dyn MetricsAggregator>,
        rate_limiter: Arc<dyn RateLimiter>,
        selector: Arc<TargetSelector>,
    ) -> Self {
        Self {
            registry,
            breakers,
            metrics,
            rate_limiter,
            selector,
        }
    }

    /// Returns the removed route, or `None` if it was already gone.
    pub async fn handle(&self, cmd: RemoveRouteCommand) -> Option<Arc<Route>> {
        let removed = self.registry.remove(&cmd.route_id);

        self.breakers.remove(&cmd.route_id);
        self.metrics.purge_route(&cmd.route_id);
        self.selector.forget(&cmd.route_id);
        self.rate_limiter.reset(&cmd.route_id).await;

        match &removed {
            Some(route) => {
                tracing::info!(route_id = %route.id, path = route.path.as_str(), "Route removed")
            }
            None => tracing::debug!(route_id = %cmd.route_id, "Route already absent"),
        }
        removed
    }
}
