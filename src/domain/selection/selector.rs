//! Target selector - runs a route's algorithm with a round-robin safety net.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::algorithms::{self, Candidates, Pick};
use super::scorer::{AdaptiveScorer, WeightedScorer};
use super::signals::SelectionSignals;
use crate::domain::foundation::RouteId;
use crate::domain::routing::{RequestContext, Route, SelectionError, Target, TargetKey};

/// A chosen target.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index into the route's target list.
    pub index: usize,
    pub target: Target,
    /// Set when the route's algorithm could not decide and round-robin was
    /// used instead.
    pub fallback: Option<SelectionError>,
}

/// Chooses one target from a route's candidate pool.
///
/// Holds one round-robin cursor per route. Cursors advance atomically, so
/// concurrent callers never see the same position twice.
pub struct TargetSelector {
    cursors: RwLock<HashMap<RouteId, Arc<AtomicUsize>>>,
    scorer: Arc<dyn AdaptiveScorer>,
}

impl TargetSelector {
    pub fn new(scorer: Arc<dyn AdaptiveScorer>) -> Self {
        Self {
            cursors: RwLock::new(HashMap::new()),
            scorer,
        }
    }

    /// Selects a target, skipping any in `excluded`.
    ///
    /// Returns `None` only when every candidate is excluded. Algorithm
    /// failures never escape: they are reported in `Selection::fallback`.
    pub fn select(
        &self,
        route: &Route,
        ctx: &RequestContext,
        signals: &SelectionSignals,
        excluded: &[TargetKey],
    ) -> Option<Selection> {
        let indices: Vec<usize> = route
            .targets
            .iter()
            .enumerate()
            .filter(|(_, t)| !excluded.contains(&t.key()))
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            return None;
        }

        let candidates = Candidates {
            route,
            indices: &indices,
        };
        let (pick, fallback) =
            match algorithms::run(route.algorithm, candidates, ctx, signals, self.scorer.as_ref()) {
                Ok(pick) => (pick, None),
                Err(err) => (algorithms::round_robin(candidates), Some(err)),
            };

        let index = match pick {
            Pick::Target(i) if indices.contains(&i) => i,
            Pick::Target(_) => self.rotate(route.id, &indices),
            Pick::RotateAmong(pool) if pool.is_empty() => self.rotate(route.id, &indices),
            Pick::RotateAmong(pool) => self.rotate(route.id, &pool),
        };

        Some(Selection {
            index,
            target: route.targets[index].clone(),
            fallback,
        })
    }

    /// Drops the cursor of a removed route.
    pub fn forget(&self, route_id: &RouteId) {
        self.cursors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(route_id);
    }

    fn rotate(&self, route_id: RouteId, pool: &[usize]) -> usize {
        let position = self.cursor(route_id).fetch_add(1, Ordering::Relaxed);
        pool[position % pool.len()]
    }

    fn cursor(&self, route_id: RouteId) -> Arc<AtomicUsize> {
        if let Some(cursor) = self
            .cursors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&route_id)
        {
            return Arc::clone(cursor);
        }
        Arc::clone(
            self.cursors
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(route_id)
                .or_default(),
        )
    }
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(Arc::new(WeightedScorer::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::routing::{RouteDefinition, RoutingAlgorithm};
    use crate::domain::selection::scorer::ScoringInput;

    fn route(algorithm: RoutingAlgorithm) -> Route {
        let targets = vec![
            Target::new("us-east", "a"),
            Target::new("eu-west", "b"),
            Target::new("ap-south", "c"),
        ];
        Route::create(
            RouteDefinition::new("/api", targets).with_algorithm(algorithm),
            Timestamp::now(),
        )
        .unwrap()
    }

    fn instances(selector: &TargetSelector, route: &Route, n: usize) -> Vec<String> {
        (0..n)
            .filter_map(|_| selector.select(route, &RequestContext::new(), &SelectionSignals::new(), &[]))
            .map(|s| s.target.instance)
            .collect()
    }

    #[test]
    fn round_robin_visits_each_target_once_in_order() {
        let selector = TargetSelector::default();
        let r = route(RoutingAlgorithm::RoundRobin);
        assert_eq!(instances(&selector, &r, 3), vec!["a", "b", "c"]);
        assert_eq!(instances(&selector, &r, 2), vec!["a", "b"]);
    }

    #[test]
    fn cursors_are_per_route() {
        let selector = TargetSelector::default();
        let first = route(RoutingAlgorithm::RoundRobin);
        let second = route(RoutingAlgorithm::RoundRobin);
        instances(&selector, &first, 2);
        assert_eq!(instances(&selector, &second, 1), vec!["a"]);
    }

    #[test]
    fn excluded_targets_are_never_chosen() {
        let selector = TargetSelector::default();
        let r = route(RoutingAlgorithm::RoundRobin);
        let excluded = [TargetKey::new("eu-west", "b")];
        for _ in 0..6 {
            let chosen = selector
                .select(&r, &RequestContext::new(), &SelectionSignals::new(), &excluded)
                .unwrap();
            assert_ne!(chosen.target.instance, "b");
        }
    }

    #[test]
    fn everything_excluded_yields_none() {
        let selector = TargetSelector::default();
        let r = route(RoutingAlgorithm::Adaptive);
        let excluded: Vec<TargetKey> = r.targets.iter().map(Target::key).collect();
        assert!(selector
            .select(&r, &RequestContext::new(), &SelectionSignals::new(), &excluded)
            .is_none());
    }

    struct BrokenScorer;

    impl AdaptiveScorer for BrokenScorer {
        fn score(&self, _input: &ScoringInput) -> f64 {
            f64::INFINITY
        }
    }

    #[test]
    fn failing_algorithm_falls_back_to_round_robin() {
        let selector = TargetSelector::new(Arc::new(BrokenScorer));
        let r = route(RoutingAlgorithm::Adaptive);
        let picks: Vec<Selection> = (0..3)
            .filter_map(|_| selector.select(&r, &RequestContext::new(), &SelectionSignals::new(), &[]))
            .collect();

        assert_eq!(picks.len(), 3);
        assert!(picks
            .iter()
            .all(|s| matches!(s.fallback, Some(SelectionError::NonFiniteScore { .. }))));
        let order: Vec<usize> = picks.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn missing_hint_falls_back_without_failing() {
        let selector = TargetSelector::default();
        let r = route(RoutingAlgorithm::Geographic);
        let chosen = selector
            .select(&r, &RequestContext::new(), &SelectionSignals::new(), &[])
            .unwrap();
        assert_eq!(chosen.fallback, Some(SelectionError::UnknownLocation));
        assert_eq!(chosen.index, 0);
    }
}
