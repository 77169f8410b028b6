//! RouteRequestHandler - turns a request into a dispatch decision.
//!
//! Order of checks: route lookup, circuit breaker, rate limit, selection,
//! liveness probe with a single retry. The handler never performs the
//! dispatch itself; it returns where the caller should send the request.

use http::Method;
use serde::Serialize;
use std::sync::Arc;

use crate::application::deps::RouterDeps;
use crate::application::health_board::HealthBoard;
use crate::domain::circuit_breaker::{Admission, CircuitState, CircuitTransition};
use crate::domain::foundation::RouteId;
use crate::domain::routing::{
    CircuitTransitioned, RequestContext, Route, RoutingAlgorithm, RoutingError, SelectorFellBack,
    Target, TargetFailedOver, TargetKey,
};
use crate::domain::selection::{InFlightTracker, Selection, SelectionSignals, TargetSelector};
use crate::ports::{
    CircuitBreakerManager, Clock, HealthChecker, MetricsAggregator, RateLimitResult, RateLimiter,
    RouteRegistry, RoutingEventSink,
};

/// Command to route one request on a known route.
#[derive(Debug, Clone)]
pub struct RouteRequestCommand {
    pub route_id: RouteId,
    pub context: RequestContext,
}

/// Where the caller should dispatch the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    pub route_id: RouteId,
    pub region: String,
    pub instance: String,
    pub dispatch_url: String,
    pub algorithm: RoutingAlgorithm,
    /// The route's algorithm could not decide and round-robin chose instead.
    pub fell_back: bool,
    /// Breaker state the request was admitted under.
    pub circuit_state: CircuitState,
}

impl RouteDecision {
    pub fn target_key(&self) -> TargetKey {
        TargetKey::new(&self.region, &self.instance)
    }
}

/// Handler for routing requests.
pub struct RouteRequestHandler {
    registry: Arc<dyn RouteRegistry>,
    breakers: Arc<dyn CircuitBreakerManager>,
    rate_limiter: Arc<dyn RateLimiter>,
    metrics: Arc<dyn MetricsAggregator>,
    health_checker: Arc<dyn HealthChecker>,
    events: Arc<dyn RoutingEventSink>,
    clock: Arc<dyn Clock>,
    selector: Arc<TargetSelector>,
    in_flight: Arc<InFlightTracker>,
    health_board: Arc<HealthBoard>,
}

impl RouteRequestHandler {
    pub fn new(deps: &RouterDeps) -> Self {
        Self {
            registry: deps.registry.clone(),
            breakers: deps.breakers.clone(),
            rate_limiter: deps.rate_limiter.clone(),
            metrics: deps.metrics.clone(),
            health_checker: deps.health_checker.clone(),
            events: deps.events.clone(),
            clock: deps.clock.clone(),
            selector: deps.selector.clone(),
            in_flight: deps.in_flight.clone(),
            health_board: deps.health_board.clone(),
        }
    }

    pub async fn handle(&self, cmd: RouteRequestCommand) -> Result<RouteDecision, RoutingError> {
        let route = self
            .registry
            .get(&cmd.route_id)
            .ok_or_else(|| RoutingError::not_found(cmd.route_id))?;
        self.decide(&route, &cmd.context).await
    }

    /// Resolves the route serving `method` and `path`, then routes on it.
    ///
    /// The path is also used as the context path when the caller left it
    /// unset, so content rules see it.
    pub async fn handle_path(
        &self,
        method: &Method,
        path: &str,
        mut context: RequestContext,
    ) -> Result<RouteDecision, RoutingError> {
        let route = self
            .registry
            .resolve(method, path)
            .ok_or_else(|| RoutingError::NoMatchingRoute {
                method: method.to_string(),
                path: path.to_string(),
            })?;
        if context.path.is_none() {
            context.path = Some(path.to_string());
        }
        self.decide(&route, &context).await
    }

    async fn decide(&self, route: &Route, ctx: &RequestContext) -> Result<RouteDecision, RoutingError> {
        // 1. Circuit breaker gate (lazy open -> half-open check happens here)
        let circuit_state = self.admit(route)?;

        // 2. Rate limit; breaker-rejected requests never reach the bucket
        if route.rate_limit.enabled {
            if let RateLimitResult::Denied(denied) =
                self.rate_limiter.check(&route.id, &route.rate_limit).await
            {
                tracing::debug!(route_id = %route.id, retry_after_ms = denied.retry_after_ms, "Rate limited");
                return Err(RoutingError::RateLimited {
                    route_id: route.id,
                    retry_after_ms: denied.retry_after_ms,
                });
            }
        }

        // 3. Select, then 4. probe with one retry
        let signals = self.signals(route);
        let mut attempted: Vec<TargetKey> = Vec::new();
        let mut selection = self.select(route, ctx, &signals, &attempted)?;

        if route.health_check.enabled && !self.probe(route, &selection.target).await {
            let failed = selection.target.key();
            attempted.push(failed.clone());

            let retry = self.selector.select(route, ctx, &signals, &attempted);
            self.events.on_target_failover(TargetFailedOver::new(
                route.id,
                failed,
                retry.as_ref().map(|s| s.target.key()),
            ));
            let Some(retry) = retry else {
                return Err(RoutingError::NoHealthyTarget {
                    route_id: route.id,
                    attempted,
                });
            };
            self.report_fallback(route, &retry);

            if !self.probe(route, &retry.target).await {
                attempted.push(retry.target.key());
                return Err(RoutingError::NoHealthyTarget {
                    route_id: route.id,
                    attempted,
                });
            }
            selection = retry;
        }

        // 5. Dispatch decision
        let target = &selection.target;
        self.in_flight.acquire(&target.key());
        tracing::debug!(
            route_id = %route.id,
            endpoint = %target.key(),
            algorithm = %route.algorithm,
            fell_back = selection.fallback.is_some(),
            "Target selected"
        );

        Ok(RouteDecision {
            route_id: route.id,
            region: target.region.clone(),
            instance: target.instance.clone(),
            dispatch_url: route.dispatch_url(target),
            algorithm: route.algorithm,
            fell_back: selection.fallback.is_some(),
            circuit_state,
        })
    }

    fn admit(&self, route: &Route) -> Result<CircuitState, RoutingError> {
        if !route.circuit_breaker.enabled {
            return Ok(CircuitState::Closed);
        }
        let now = self.clock.now();
        match self.breakers.admit(&route.id, &route.circuit_breaker, now) {
            Admission::Allowed {
                transition: Some(transition),
            } => {
                self.report_transition(route.id, &transition);
                Ok(transition.to)
            }
            Admission::Allowed { transition: None } => Ok(self
                .breakers
                .snapshot(&route.id, &route.circuit_breaker, now)
                .map(|s| s.state)
                .unwrap_or_default()),
            Admission::Rejected {
                retry_after,
                consecutive_failures,
            } => Err(RoutingError::CircuitOpen {
                route_id: route.id,
                state: CircuitState::Open,
                consecutive_failures,
                retry_after_ms: retry_after.as_millis() as u64,
            }),
        }
    }

    fn signals(&self, route: &Route) -> SelectionSignals {
        let keys: Vec<TargetKey> = route.targets.iter().map(Target::key).collect();
        SelectionSignals {
            loads: self.metrics.target_loads(&route.id, &keys),
            in_flight: self.in_flight.snapshot(&keys),
            health: self.health_board.snapshot(&keys),
        }
    }

    fn select(
        &self,
        route: &Route,
        ctx: &RequestContext,
        signals: &SelectionSignals,
        excluded: &[TargetKey],
    ) -> Result<Selection, RoutingError> {
        let selection = self
            .selector
            .select(route, ctx, signals, excluded)
            .ok_or_else(|| RoutingError::NoHealthyTarget {
                route_id: route.id,
                attempted: excluded.to_vec(),
            })?;
        self.report_fallback(route, &selection);
        Ok(selection)
    }

    async fn probe(&self, route: &Route, target: &Target) -> bool {
        let policy = &route.health_check;
        let healthy = self
            .health_checker
            .is_healthy(target, &policy.path, policy.timeout())
            .await;
        self.health_board
            .record(target.key(), healthy, self.clock.now());
        healthy
    }

    fn report_fallback(&self, route: &Route, selection: &Selection) {
        let Some(err) = &selection.fallback else {
            return;
        };
        if err.is_expected() {
            tracing::debug!(route_id = %route.id, algorithm = %route.algorithm, reason = %err, "Using round robin");
        } else {
            self.events.on_selector_fallback(SelectorFellBack::new(
                route.id,
                route.algorithm,
                err.to_string(),
            ));
        }
    }

    fn report_transition(&self, route_id: RouteId, transition: &CircuitTransition) {
        self.events
            .on_circuit_transition(CircuitTransitioned::new(route_id, transition));
    }
}
