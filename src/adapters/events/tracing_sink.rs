//! Event sink that writes routing events to the tracing log.

use crate::domain::circuit_breaker::CircuitState;
use crate::domain::routing::{CircuitTransitioned, SelectorFellBack, TargetFailedOver};
use crate::ports::RoutingEventSink;

/// Logs every routing event. Breaker openings and failovers are warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl RoutingEventSink for TracingEventSink {
    fn on_circuit_transition(&self, event: CircuitTransitioned) {
        if event.to == CircuitState::Open {
            tracing::warn!(
                route_id = %event.route_id,
                from = %event.from,
                to = %event.to,
                consecutive_failures = event.consecutive_failures,
                "Circuit opened"
            );
        } else {
            tracing::info!(
                route_id = %event.route_id,
                from = %event.from,
                to = %event.to,
                "Circuit transitioned"
            );
        }
    }

    fn on_target_failover(&self, event: TargetFailedOver) {
        match &event.replacement {
            Some(replacement) => tracing::warn!(
                route_id = %event.route_id,
                failed = %event.failed,
                replacement = %replacement,
                "Target failed probe, failing over"
            ),
            None => tracing::warn!(
                route_id = %event.route_id,
                failed = %event.failed,
                "Target failed probe, no replacement available"
            ),
        }
    }

    fn on_selector_fallback(&self, event: SelectorFellBack) {
        tracing::warn!(
            route_id = %event.route_id,
            algorithm = %event.algorithm,
            reason = %event.reason,
            "Selector fell back to round robin"
        );
    }
}
