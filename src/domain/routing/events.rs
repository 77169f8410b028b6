//! Events emitted by the routing layer to external collaborators.

use serde::Serialize;

use super::algorithm::RoutingAlgorithm;
use super::target::TargetKey;
use crate::domain::circuit_breaker::{CircuitState, CircuitTransition};
use crate::domain::foundation::{RouteId, Timestamp};

/// A route's circuit breaker changed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitTransitioned {
    pub route_id: RouteId,
    pub from: CircuitState,
    pub to: CircuitState,
    pub consecutive_failures: u32,
    pub occurred_at: Timestamp,
}

impl CircuitTransitioned {
    pub fn new(route_id: RouteId, transition: &CircuitTransition) -> Self {
        Self {
            route_id,
            from: transition.from,
            to: transition.to,
            consecutive_failures: transition.consecutive_failures,
            occurred_at: transition.at,
        }
    }
}

/// A selected target failed its probe and another was tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailedOver {
    pub route_id: RouteId,
    pub failed: TargetKey,
    /// `None` when no replacement was available.
    pub replacement: Option<TargetKey>,
    pub occurred_at: Timestamp,
}

impl TargetFailedOver {
    pub fn new(route_id: RouteId, failed: TargetKey, replacement: Option<TargetKey>) -> Self {
        Self {
            route_id,
            failed,
            replacement,
            occurred_at: Timestamp::now(),
        }
    }
}

/// An algorithm errored internally and round-robin was used instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorFellBack {
    pub route_id: RouteId,
    pub algorithm: RoutingAlgorithm,
    pub reason: String,
    pub occurred_at: Timestamp,
}

impl SelectorFellBack {
    pub fn new(route_id: RouteId, algorithm: RoutingAlgorithm, reason: impl Into<String>) -> Self {
        Self {
            route_id,
            algorithm,
            reason: reason.into(),
            occurred_at: Timestamp::now(),
        }
    }
}
