//! GetStatsHandler - windowed load balancer statistics.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::application::health_board::HealthBoard;
use crate::domain::foundation::{HealthScore, RouteId};
use crate::domain::metrics::LoadBalancerStats;
use crate::domain::routing::TargetKey;
use crate::ports::{MetricsAggregator, RouteRegistry};

/// Query for statistics over the trailing `window`.
#[derive(Debug, Clone, Copy)]
pub struct GetStatsQuery {
    pub window: Duration,
}

/// Handler for statistics queries.
pub struct GetStatsHandler {
    registry: Arc<dyn RouteRegistry>,
    metrics: Arc<dyn MetricsAggregator>,
    health_board: Arc<HealthBoard>,
}

impl GetStatsHandler {
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        metrics: Arc<dyn MetricsAggregator>,
        health_board: Arc<HealthBoard>,
    ) -> Self {
        Self {
            registry,
            metrics,
            health_board,
        }
    }

    /// Region health combines the outcome success rate with the share of the
    /// region's probed targets that passed their last probe.
    ///
    /// Only registered routes are reported, and only their targets count
    /// towards region health.
    pub fn handle(&self, query: GetStatsQuery) -> LoadBalancerStats {
        let mut stats = self.metrics.compute_stats(query.window);
        let routes = self.registry.list();

        let live: HashSet<RouteId> = routes.iter().map(|r| r.id).collect();
        stats.routes.retain(|id, _| live.contains(id));

        let targets: HashSet<TargetKey> = routes
            .iter()
            .flat_map(|r| r.targets.iter().map(|t| t.key()))
            .collect();
        for (region, summary) in stats.regions.iter_mut() {
            if let Some(fraction) = self.health_board.region_healthy_fraction(region, &targets) {
                summary.health_score = HealthScore::new(summary.health_score.value() * fraction);
            }
        }
        stats
    }
}
