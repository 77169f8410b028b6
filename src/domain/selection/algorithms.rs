//! Selection algorithms.
//!
//! Each algorithm is a pure function of the candidate pool, the request
//! context and a signal snapshot. None of them block or perform I/O. An
//! algorithm that cannot decide returns a [`SelectionError`] and the selector
//! falls back to round-robin.

use std::cmp::Ordering;

use super::scorer::{AdaptiveScorer, ScoringInput};
use super::signals::SelectionSignals;
use crate::domain::routing::geography::{distance_km, location_coordinates, region_coordinates};
use crate::domain::routing::{RequestContext, Route, RoutingAlgorithm, SelectionError, Target};

/// What an algorithm decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    /// Index into the route's target list.
    Target(usize),
    /// Rotate through these indices with the route's cursor.
    RotateAmong(Vec<usize>),
}

/// Candidate targets of a route that survived exclusion.
#[derive(Debug, Clone, Copy)]
pub struct Candidates<'a> {
    pub route: &'a Route,
    pub indices: &'a [usize],
}

impl<'a> Candidates<'a> {
    fn iter(&self) -> impl Iterator<Item = (usize, &'a Target)> + '_ {
        let targets = &self.route.targets;
        self.indices.iter().map(move |&i| (i, &targets[i]))
    }

    fn in_region(&self, region: &str) -> Vec<usize> {
        self.iter()
            .filter(|(_, t)| t.region.eq_ignore_ascii_case(region))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Runs the named algorithm over the candidates.
pub fn run(
    algorithm: RoutingAlgorithm,
    candidates: Candidates<'_>,
    ctx: &RequestContext,
    signals: &SelectionSignals,
    scorer: &dyn AdaptiveScorer,
) -> Result<Pick, SelectionError> {
    if candidates.indices.is_empty() {
        return Err(SelectionError::EmptyPool);
    }
    match algorithm {
        RoutingAlgorithm::RoundRobin => Ok(round_robin(candidates)),
        RoutingAlgorithm::LeastConnections => least_connections(candidates, signals),
        RoutingAlgorithm::Geographic => geographic(candidates, ctx, signals),
        RoutingAlgorithm::LatencyBased => latency_based(candidates, signals),
        RoutingAlgorithm::CostBased => cost_based(candidates, signals),
        RoutingAlgorithm::UserBased => user_based(candidates, ctx, signals),
        RoutingAlgorithm::ContentBased => content_based(candidates, ctx, signals),
        RoutingAlgorithm::Adaptive => adaptive(candidates, signals, scorer),
    }
}

pub fn round_robin(candidates: Candidates<'_>) -> Pick {
    Pick::RotateAmong(candidates.indices.to_vec())
}

/// Fewest in-flight; first registered wins ties.
pub fn least_connections(
    candidates: Candidates<'_>,
    signals: &SelectionSignals,
) -> Result<Pick, SelectionError> {
    least_loaded(candidates, candidates.indices, signals)
}

pub fn geographic(
    candidates: Candidates<'_>,
    ctx: &RequestContext,
    signals: &SelectionSignals,
) -> Result<Pick, SelectionError> {
    let Some(origin) = ctx.user_location.as_ref().and_then(location_coordinates) else {
        return Err(SelectionError::UnknownLocation);
    };

    let mut nearest: Option<(f64, &str)> = None;
    for (_, target) in candidates.iter() {
        let Some(coords) = region_coordinates(&target.region) else {
            continue;
        };
        let distance = distance_km(origin, coords);
        if nearest.map_or(true, |(best, _)| distance < best) {
            nearest = Some((distance, target.region.as_str()));
        }
    }

    let (_, region) = nearest.ok_or(SelectionError::UnknownLocation)?;
    least_loaded(candidates, &candidates.in_region(region), signals)
}

/// Lowest recent average latency; first registered wins ties.
pub fn latency_based(
    candidates: Candidates<'_>,
    signals: &SelectionSignals,
) -> Result<Pick, SelectionError> {
    fastest(candidates, candidates.indices, signals)
        .map(Pick::Target)
        .ok_or(SelectionError::NoMetrics)
}

/// Cheapest configured region. Ties go to latency, then rotate.
pub fn cost_based(
    candidates: Candidates<'_>,
    signals: &SelectionSignals,
) -> Result<Pick, SelectionError> {
    let costs = &candidates.route.rules.region_costs;
    let priced: Vec<(usize, f64)> = candidates
        .iter()
        .filter_map(|(i, t)| costs.get(&t.region).map(|c| (i, *c)))
        .collect();

    let cheapest = priced
        .iter()
        .map(|(_, c)| *c)
        .min_by(f64::total_cmp)
        .ok_or(SelectionError::NoCostConfigured)?;

    let tied: Vec<usize> = priced
        .iter()
        .filter(|(_, c)| c.total_cmp(&cheapest) == Ordering::Equal)
        .map(|(i, _)| *i)
        .collect();

    if let [only] = tied.as_slice() {
        return Ok(Pick::Target(*only));
    }
    Ok(match fastest(candidates, &tied, signals) {
        Some(idx) => Pick::Target(idx),
        None => Pick::RotateAmong(tied),
    })
}

/// User affinity mapping, then the caller's preferred region.
pub fn user_based(
    candidates: Candidates<'_>,
    ctx: &RequestContext,
    signals: &SelectionSignals,
) -> Result<Pick, SelectionError> {
    let affinity = ctx
        .user_id
        .as_ref()
        .and_then(|user| candidates.route.rules.user_affinity.get(user));

    for region in affinity.into_iter().chain(ctx.preferred_region.as_ref()) {
        let pool = candidates.in_region(region);
        if !pool.is_empty() {
            return least_loaded(candidates, &pool, signals);
        }
    }
    Err(SelectionError::NoRuleMatched)
}

/// First matching content rule whose region has a candidate.
pub fn content_based(
    candidates: Candidates<'_>,
    ctx: &RequestContext,
    signals: &SelectionSignals,
) -> Result<Pick, SelectionError> {
    let region = candidates
        .route
        .rules
        .content_region(ctx)
        .ok_or(SelectionError::NoRuleMatched)?;
    let pool = candidates.in_region(region);
    if pool.is_empty() {
        return Err(SelectionError::NoRuleMatched);
    }
    least_loaded(candidates, &pool, signals)
}

/// Highest score wins; first registered wins ties.
pub fn adaptive(
    candidates: Candidates<'_>,
    signals: &SelectionSignals,
    scorer: &dyn AdaptiveScorer,
) -> Result<Pick, SelectionError> {
    let max_weight = candidates.iter().map(|(_, t)| t.weight).max().unwrap_or(0);

    let mut best: Option<(usize, f64)> = None;
    for (i, target) in candidates.iter() {
        let score = scorer.score(&ScoringInput::gather(target, max_weight, signals));
        if !score.is_finite() {
            return Err(SelectionError::NonFiniteScore { index: i });
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| Pick::Target(i))
        .ok_or(SelectionError::EmptyPool)
}

fn least_loaded(
    candidates: Candidates<'_>,
    pool: &[usize],
    signals: &SelectionSignals,
) -> Result<Pick, SelectionError> {
    pool.iter()
        .copied()
        .min_by_key(|&i| signals.in_flight(&candidates.route.targets[i].key()))
        .map(Pick::Target)
        .ok_or(SelectionError::EmptyPool)
}

fn fastest(candidates: Candidates<'_>, pool: &[usize], signals: &SelectionSignals) -> Option<usize> {
    pool.iter()
        .filter_map(|&i| {
            signals
                .avg_latency_ms(&candidates.route.targets[i].key())
                .map(|ms| (i, ms))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
