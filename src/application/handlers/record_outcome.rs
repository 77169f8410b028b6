//! RecordOutcomeHandler - feeds a completed dispatch back into the engine.

use std::sync::Arc;

use crate::domain::foundation::RouteId;
use crate::domain::metrics::RequestMetric;
use crate::domain::routing::{CircuitTransitioned, RoutingError, TargetKey};
use crate::domain::selection::InFlightTracker;
use crate::ports::{CircuitBreakerManager, Clock, MetricsAggregator, RouteRegistry, RoutingEventSink};

/// Outcome of one dispatched request, reported exactly once by the caller.
#[derive(Debug, Clone)]
pub struct RecordOutcomeCommand {
    pub route_id: RouteId,
    pub region: String,
    pub instance: String,
    pub response_time_ms: f64,
    pub status_code: u16,
    pub is_error: bool,
}

impl RecordOutcomeCommand {
    /// Outcome for the target of a previous decision.
    pub fn for_target(
        route_id: RouteId,
        target: &TargetKey,
        response_time_ms: f64,
        status_code: u16,
        is_error: bool,
    ) -> Self {
        Self {
            route_id,
            region: target.region.clone(),
            instance: target.instance.clone(),
            response_time_ms,
            status_code,
            is_error,
        }
    }
}

/// Handler for recording outcomes.
pub struct RecordOutcomeHandler {
    registry: Arc<dyn RouteRegistry>,
    metrics: Arc<dyn MetricsAggregator>,
    breakers: Arc<dyn CircuitBreakerManager>,
    events: Arc<dyn RoutingEventSink>,
    clock: Arc<dyn Clock>,
    in_flight: Arc<InFlightTracker>,
}

impl RecordOutcomeHandler {
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        metrics: Arc<dyn MetricsAggregator>,
        breakers: Arc<dyn CircuitBreakerManager>,
        events: Arc<dyn RoutingEventSink>,
        clock: Arc<dyn Clock>,
        in_flight: Arc<InFlightTracker>,
    ) -> Self {
        Self {
            registry,
            metrics,
            breakers,
            events,
            clock,
            in_flight,
        }
    }

    pub fn handle(&self, cmd: RecordOutcomeCommand) -> Result<(), RoutingError> {
        let route = self
            .registry
            .get(&cmd.route_id)
            .ok_or_else(|| RoutingError::not_found(cmd.route_id))?;
        let now = self.clock.now();
        let key = TargetKey::new(cmd.region, cmd.instance);

        // 1. Metrics and in-flight bookkeeping
        self.metrics.record(RequestMetric::new(
            route.id,
            &key,
            now,
            cmd.response_time_ms,
            cmd.status_code,
            cmd.is_error,
        ));
        self.in_flight.release(&key);

        // 2. Route removed while the outcome was in flight
        if self.registry.get(&route.id).is_none() {
            self.metrics.purge_route(&route.id);
            tracing::debug!(route_id = %route.id, "Outcome for removed route discarded");
            return Ok(());
        }

        // 3. Breaker, unless disabled for this route
        if !route.circuit_breaker.enabled {
            return Ok(());
        }
        let transition = if cmd.is_error {
            self.breakers
                .report_failure(&route.id, &route.circuit_breaker, now)
        } else {
            self.breakers
                .report_success(&route.id, &route.circuit_breaker, now)
        };
        if let Some(transition) = transition {
            self.events
                .on_circuit_transition(CircuitTransitioned::new(route.id, &transition));
        }
        Ok(())
    }
}
