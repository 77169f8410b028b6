//! Router - composition root of the routing engine.
//!
//! One `Router` is built at startup from a [`RouterDeps`] and shared by
//! reference; nothing in the engine is global.

use http::Method;
use std::sync::Arc;
use std::time::Duration;

use super::deps::RouterDeps;
use super::handlers::{
    CreateRouteCommand, CreateRouteHandler, GetStatsHandler, GetStatsQuery, RecordOutcomeCommand,
    RecordOutcomeHandler, RemoveRouteCommand, RemoveRouteHandler, RouteDecision,
    RouteRequestCommand, RouteRequestHandler, UpdateRouteCommand, UpdateRouteHandler,
};
use super::health_board::HealthRecord;
use super::health_sweep::HealthSweep;
use crate::domain::circuit_breaker::CircuitBreakerSnapshot;
use crate::domain::foundation::RouteId;
use crate::domain::metrics::LoadBalancerStats;
use crate::domain::routing::{
    RequestContext, Route, RouteDefinition, RoutePolicyUpdate, RoutingError, TargetKey,
};
use crate::ports::RateLimitStatus;

/// Routing decision layer.
pub struct Router {
    deps: RouterDeps,
    default_stats_window: Duration,
    create_route: CreateRouteHandler,
    route_request: RouteRequestHandler,
    record_outcome: RecordOutcomeHandler,
    update_route: UpdateRouteHandler,
    remove_route: RemoveRouteHandler,
    get_stats: GetStatsHandler,
}

impl Router {
    pub fn new(deps: RouterDeps) -> Self {
        Self {
            default_stats_window: Duration::from_secs(3600),
            create_route: CreateRouteHandler::new(
                deps.registry.clone(),
                deps.breakers.clone(),
                deps.clock.clone(),
            ),
            route_request: RouteRequestHandler::new(&deps),
            record_outcome: RecordOutcomeHandler::new(
                deps.registry.clone(),
                deps.metrics.clone(),
                deps.breakers.clone(),
                deps.events.clone(),
                deps.clock.clone(),
                deps.in_flight.clone(),
            ),
            update_route: UpdateRouteHandler::new(deps.registry.clone(), deps.clock.clone()),
            remove_route: RemoveRouteHandler::new(
                deps.registry.clone(),
                deps.breakers.clone(),
                deps.metrics.clone(),
                deps.rate_limiter.clone(),
                deps.selector.clone(),
            ),
            get_stats: GetStatsHandler::new(
                deps.registry.clone(),
                deps.metrics.clone(),
                deps.health_board.clone(),
            ),
            deps,
        }
    }

    /// Window used by [`stats`](Self::stats).
    pub fn with_default_stats_window(mut self, window: Duration) -> Self {
        self.default_stats_window = window;
        self
    }

    // ─── Routes ───

    pub fn create_route(&self, definition: RouteDefinition) -> Result<RouteId, RoutingError> {
        self.create_route
            .handle(CreateRouteCommand { definition })
            .map(|route| route.id)
    }

    /// Registers definitions in order, stopping at the first invalid one.
    pub fn load_routes(
        &self,
        definitions: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<Vec<RouteId>, RoutingError> {
        definitions
            .into_iter()
            .map(|definition| self.create_route(definition))
            .collect()
    }

    pub fn get_route(&self, route_id: &RouteId) -> Result<Arc<Route>, RoutingError> {
        self.deps
            .registry
            .get(route_id)
            .ok_or_else(|| RoutingError::not_found(*route_id))
    }

    pub fn list_routes(&self) -> Vec<Arc<Route>> {
        self.deps.registry.list()
    }

    pub fn update_route(
        &self,
        route_id: RouteId,
        update: RoutePolicyUpdate,
    ) -> Result<Arc<Route>, RoutingError> {
        self.update_route
            .handle(UpdateRouteCommand { route_id, update })
    }

    /// Idempotent: returns `None` if the route was already gone.
    pub async fn remove_route(&self, route_id: RouteId) -> Option<Arc<Route>> {
        self.remove_route
            .handle(RemoveRouteCommand { route_id })
            .await
    }

    // ─── Dispatch ───

    pub async fn route_request(
        &self,
        route_id: RouteId,
        context: RequestContext,
    ) -> Result<RouteDecision, RoutingError> {
        self.route_request
            .handle(RouteRequestCommand { route_id, context })
            .await
    }

    /// Routes by method and concrete path instead of route id.
    pub async fn route_path(
        &self,
        method: &Method,
        path: &str,
        context: RequestContext,
    ) -> Result<RouteDecision, RoutingError> {
        self.route_request.handle_path(method, path, context).await
    }

    pub fn record_outcome(&self, outcome: RecordOutcomeCommand) -> Result<(), RoutingError> {
        self.record_outcome.handle(outcome)
    }

    // ─── Observability ───

    pub fn get_stats(&self, window: Duration) -> LoadBalancerStats {
        self.get_stats.handle(GetStatsQuery { window })
    }

    /// Statistics over the configured default window.
    pub fn stats(&self) -> LoadBalancerStats {
        self.get_stats(self.default_stats_window)
    }

    pub fn circuit_state(&self, route_id: &RouteId) -> Result<CircuitBreakerSnapshot, RoutingError> {
        let route = self.get_route(route_id)?;
        self.deps
            .breakers
            .snapshot(&route.id, &route.circuit_breaker, self.deps.clock.now())
            .ok_or_else(|| RoutingError::not_found(*route_id))
    }

    /// Forces a route's breaker closed.
    pub fn reset_circuit(&self, route_id: &RouteId) -> Result<(), RoutingError> {
        let route = self.get_route(route_id)?;
        if !self.deps.breakers.reset(&route.id) {
            self.deps.breakers.register(route.id);
        }
        tracing::info!(route_id = %route.id, "Circuit reset");
        Ok(())
    }

    pub async fn rate_limit_status(&self, route_id: &RouteId) -> Result<RateLimitStatus, RoutingError> {
        let route = self.get_route(route_id)?;
        Ok(self
            .deps
            .rate_limiter
            .status(&route.id, &route.rate_limit)
            .await)
    }

    pub fn health(&self, target: &TargetKey) -> Option<HealthRecord> {
        self.deps.health_board.get(target)
    }

    pub fn in_flight(&self, target: &TargetKey) -> u64 {
        self.deps.in_flight.get(target)
    }

    /// Background prober over this router's routes.
    pub fn health_sweep(&self, period: Duration) -> HealthSweep {
        HealthSweep::new(
            self.deps.registry.clone(),
            self.deps.health_checker.clone(),
            self.deps.health_board.clone(),
            self.deps.clock.clone(),
            period,
        )
    }
}
