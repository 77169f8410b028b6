//! In-memory circuit breaker manager with per-route locking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::circuit_breaker::{
    Admission, CircuitBreakerSnapshot, CircuitBreakerState, CircuitTransition,
};
use crate::domain::foundation::{RouteId, Timestamp};
use crate::domain::routing::CircuitBreakerPolicy;
use crate::ports::CircuitBreakerManager;

type Breaker = Arc<Mutex<CircuitBreakerState>>;

/// Each route's breaker sits behind its own mutex.
///
/// The outer map is read-locked on the hot path and write-locked only when a
/// route's breaker is registered or removed, so outcomes on one route never
/// contend with another route's. Only `register` creates a breaker: calls for
/// an unregistered id (a route removed mid-request) leave the map untouched.
#[derive(Debug, Default)]
pub struct InMemoryCircuitBreakerManager {
    breakers: RwLock<HashMap<RouteId, Breaker>>,
}

impl InMemoryCircuitBreakerManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn existing(&self, route_id: &RouteId) -> Option<Breaker> {
        self.breakers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route_id)
            .cloned()
    }

    fn with_breaker<R>(
        &self,
        route_id: &RouteId,
        f: impl FnOnce(&mut CircuitBreakerState) -> R,
    ) -> Option<R> {
        let breaker = self.existing(route_id)?;
        let mut state = breaker.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut *state))
    }
}

impl CircuitBreakerManager for InMemoryCircuitBreakerManager {
    fn register(&self, route_id: RouteId) {
        self.breakers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(route_id)
            .or_default();
    }

    fn admit(&self, route_id: &RouteId, policy: &CircuitBreakerPolicy, now: Timestamp) -> Admission {
        self.with_breaker(route_id, |b| b.admit(policy, now))
            .unwrap_or(Admission::Allowed { transition: None })
    }

    fn report_success(
        &self,
        route_id: &RouteId,
        policy: &CircuitBreakerPolicy,
        now: Timestamp,
    ) -> Option<CircuitTransition> {
        self.with_breaker(route_id, |b| b.on_success(policy, now))
            .flatten()
    }

    fn report_failure(
        &self,
        route_id: &RouteId,
        policy: &CircuitBreakerPolicy,
        now: Timestamp,
    ) -> Option<CircuitTransition> {
        self.with_breaker(route_id, |b| b.on_failure(policy, now))
            .flatten()
    }

    fn snapshot(
        &self,
        route_id: &RouteId,
        policy: &CircuitBreakerPolicy,
        now: Timestamp,
    ) -> Option<CircuitBreakerSnapshot> {
        let breaker = self.existing(route_id)?;
        let state = breaker.lock().unwrap_or_else(PoisonError::into_inner);
        Some(state.snapshot(policy, now))
    }

    fn reset(&self, route_id: &RouteId) -> bool {
        let Some(breaker) = self.existing(route_id) else {
            return false;
        };
        breaker.lock().unwrap_or_else(PoisonError::into_inner).reset();
        true
    }

    fn remove(&self, route_id: &RouteId) {
        self.breakers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(route_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::circuit_breaker::CircuitState;
    use std::time::Duration;

    fn policy() -> CircuitBreakerPolicy {
        CircuitBreakerPolicy::default()
    }

    #[test]
    fn registered_breaker_starts_closed() {
        let manager = InMemoryCircuitBreakerManager::new();
        let route = RouteId::new();
        manager.register(route);
        let snapshot = manager.snapshot(&route, &policy(), Timestamp::now()).unwrap();
        assert_eq!(snapshot.state, CircuitState::Closed);
    }

    #[test]
    fn routes_are_independent() {
        let manager = InMemoryCircuitBreakerManager::new();
        let failing = RouteId::new();
        let healthy = RouteId::new();
        manager.register(failing);
        manager.register(healthy);
        let now = Timestamp::now();

        for _ in 0..5 {
            manager.report_failure(&failing, &policy(), now);
        }
        assert!(!manager.admit(&failing, &policy(), now).is_allowed());
        assert!(manager.admit(&healthy, &policy(), now).is_allowed());
    }

    #[test]
    fn reset_reopens_traffic() {
        let manager = InMemoryCircuitBreakerManager::new();
        let route = RouteId::new();
        manager.register(route);
        let now = Timestamp::now();
        for _ in 0..5 {
            manager.report_failure(&route, &policy(), now);
        }
        assert!(manager.reset(&route));
        assert!(manager.admit(&route, &policy(), now).is_allowed());
        assert!(!manager.reset(&RouteId::new()));
    }

    #[test]
    fn remove_discards_state() {
        let manager = InMemoryCircuitBreakerManager::new();
        let route = RouteId::new();
        manager.register(route);
        manager.report_failure(&route, &policy(), Timestamp::now());
        manager.remove(&route);
        assert!(manager.snapshot(&route, &policy(), Timestamp::now()).is_none());
    }

    #[test]
    fn calls_after_removal_do_not_recreate_breaker() {
        let manager = InMemoryCircuitBreakerManager::new();
        let route = RouteId::new();
        let strict = policy().with_failure_threshold(1);
        let now = Timestamp::now();
        manager.register(route);
        manager.remove(&route);

        assert!(manager.report_failure(&route, &strict, now).is_none());
        assert!(manager.report_success(&route, &strict, now).is_none());
        assert!(manager.admit(&route, &strict, now).is_allowed());
        assert!(manager.snapshot(&route, &strict, now).is_none());
        assert!(manager.breakers.read().unwrap().is_empty());
    }

    #[test]
    fn concurrent_failures_are_all_counted() {
        let manager = Arc::new(InMemoryCircuitBreakerManager::new());
        let route = RouteId::new();
        manager.register(route);
        let lenient = policy().with_failure_threshold(1_000_000);
        let now = Timestamp::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let lenient = lenient.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        manager.report_failure(&route, &lenient, now);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = manager
            .snapshot(&route, &lenient, now.plus(Duration::from_secs(1)))
            .unwrap();
        assert_eq!(snapshot.consecutive_failures, 4000);
        assert_eq!(snapshot.total_failures, 4000);
    }
}
