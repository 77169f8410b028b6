//! Routing event sink - notifications for external collaborators.

use crate::domain::routing::{CircuitTransitioned, SelectorFellBack, TargetFailedOver};

/// Callback for receiving routing events (breaker changes, failovers).
///
/// Called inline on the routing path, so implementations must not block.
pub trait RoutingEventSink: Send + Sync {
    /// Called when a route's circuit breaker changes state.
    fn on_circuit_transition(&self, event: CircuitTransitioned);

    /// Called when a target fails its probe before dispatch.
    fn on_target_failover(&self, event: TargetFailedOver);

    /// Called when an algorithm fails internally and round-robin is used.
    fn on_selector_fallback(&self, event: SelectorFellBack);
}

/// No-op sink for when event tracking isn't needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl RoutingEventSink for NoOpEventSink {
    fn on_circuit_transition(&self, _event: CircuitTransitioned) {}
    fn on_target_failover(&self, _event: TargetFailedOver) {}
    fn on_selector_fallback(&self, _event: SelectorFellBack) {}
}
