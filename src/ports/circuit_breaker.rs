//! CircuitBreakerManager port - per-route failure gating.
//!
//! One independent breaker per route. Implementations must scope mutual
//! exclusion to a single route so traffic on one route never waits on
//! another route's breaker.
//!
//! Time is passed in by the caller. The open-to-half-open move happens
//! lazily inside [`CircuitBreakerManager::admit`], so no background timer is
//! needed.

use crate::domain::circuit_breaker::{Admission, CircuitBreakerSnapshot, CircuitTransition};
use crate::domain::foundation::{RouteId, Timestamp};
use crate::domain::routing::CircuitBreakerPolicy;

pub trait CircuitBreakerManager: Send + Sync {
    /// Creates a closed breaker for the route if none exists.
    fn register(&self, route_id: RouteId);

    /// Gates a dispatch attempt. Unregistered routes are admitted.
    fn admit(&self, route_id: &RouteId, policy: &CircuitBreakerPolicy, now: Timestamp) -> Admission;

    /// Records a successful outcome.
    fn report_success(
        &self,
        route_id: &RouteId,
        policy: &CircuitBreakerPolicy,
        now: Timestamp,
    ) -> Option<CircuitTransition>;

    /// Records a failed outcome.
    ///
    /// Outcomes for unregistered routes are dropped without creating state.
    fn report_failure(
        &self,
        route_id: &RouteId,
        policy: &CircuitBreakerPolicy,
        now: Timestamp,
    ) -> Option<CircuitTransition>;

    /// Current state and counters, if the route has a breaker.
    fn snapshot(
        &self,
        route_id: &RouteId,
        policy: &CircuitBreakerPolicy,
        now: Timestamp,
    ) -> Option<CircuitBreakerSnapshot>;

    /// Forces the breaker closed. Returns false if the route has none.
    ///
    /// Use sparingly - typically for administrative intervention.
    fn reset(&self, route_id: &RouteId) -> bool;

    /// Discards the route's breaker.
    fn remove(&self, route_id: &RouteId);
}
