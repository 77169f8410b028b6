//! Derived aggregates computed on read from recorded metrics.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::metric::RequestMetric;
use crate::domain::foundation::{HealthScore, RouteId, Timestamp};

/// Request counts and response times for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub request_count: u64,
    pub error_count: u64,
    pub average_response_time_ms: f64,
}

/// Request counts, response time and health for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub request_count: u64,
    pub error_count: u64,
    pub average_response_time_ms: f64,
    pub health_score: HealthScore,
}

/// Statistics over the metrics recorded within a time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadBalancerStats {
    pub window_ms: u64,
    pub computed_at: Timestamp,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub routes: BTreeMap<RouteId, RouteSummary>,
    pub regions: BTreeMap<String, RegionSummary>,
}

#[derive(Default)]
struct Accumulator {
    requests: u64,
    errors: u64,
    total_ms: f64,
}

impl Accumulator {
    fn add(&mut self, metric: &RequestMetric) {
        self.requests += 1;
        if metric.is_error {
            self.errors += 1;
        }
        self.total_ms += metric.response_time_ms;
    }

    fn average(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.total_ms / self.requests as f64
        }
    }
}

impl LoadBalancerStats {
    /// Aggregates the metrics whose timestamp lies in `[now - window, now]`.
    pub fn compute<'a, I>(metrics: I, window: Duration, now: Timestamp) -> Self
    where
        I: IntoIterator<Item = &'a RequestMetric>,
    {
        let since = now.minus(window);
        let mut overall = Accumulator::default();
        let mut routes: BTreeMap<RouteId, Accumulator> = BTreeMap::new();
        let mut regions: BTreeMap<String, Accumulator> = BTreeMap::new();
        let mut response_times = Vec::new();

        for metric in metrics {
            if metric.timestamp.is_before(&since) || metric.timestamp.is_after(&now) {
                continue;
            }
            overall.add(metric);
            routes.entry(metric.route_id).or_default().add(metric);
            regions.entry(metric.region.clone()).or_default().add(metric);
            response_times.push(metric.response_time_ms);
        }

        response_times.sort_by(f64::total_cmp);

        Self {
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            computed_at: now,
            total_requests: overall.requests,
            successful_requests: overall.requests - overall.errors,
            failed_requests: overall.errors,
            average_response_time_ms: overall.average(),
            p50_ms: percentile(&response_times, 0.50),
            p95_ms: percentile(&response_times, 0.95),
            p99_ms: percentile(&response_times, 0.99),
            routes: routes
                .into_iter()
                .map(|(id, acc)| {
                    (
                        id,
                        RouteSummary {
                            request_count: acc.requests,
                            error_count: acc.errors,
                            average_response_time_ms: acc.average(),
                        },
                    )
                })
                .collect(),
            regions: regions
                .into_iter()
                .map(|(region, acc)| {
                    (
                        region,
                        RegionSummary {
                            request_count: acc.requests,
                            error_count: acc.errors,
                            average_response_time_ms: acc.average(),
                            health_score: HealthScore::from_outcomes(acc.requests, acc.errors),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Value at index `floor(n * p)` of an ascending slice, clamped to the last
/// element. Empty input yields 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64) * p).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::routing::TargetKey;
    use proptest::prelude::*;

    fn metric(route: RouteId, region: &str, at: Timestamp, ms: f64, is_error: bool) -> RequestMetric {
        RequestMetric::new(
            route,
            &TargetKey::new(region, "i-1"),
            at,
            ms,
            if is_error { 503 } else { 200 },
            is_error,
        )
    }

    #[test]
    fn percentiles_follow_floor_index_rule() {
        let route = RouteId::new();
        let now = Timestamp::now();
        let metrics: Vec<_> = [100.0, 200.0, 300.0, 400.0, 500.0]
            .into_iter()
            .map(|ms| metric(route, "us-east", now, ms, false))
            .collect();

        let stats = LoadBalancerStats::compute(&metrics, Duration::from_secs(3600), now);
        assert_eq!(stats.p50_ms, 300.0);
        assert_eq!(stats.p95_ms, 500.0);
        assert_eq!(stats.p99_ms, 500.0);
        assert_eq!(stats.average_response_time_ms, 300.0);
    }

    #[test]
    fn empty_window_reports_zero_percentiles() {
        let none: Vec<RequestMetric> = Vec::new();
        let stats = LoadBalancerStats::compute(&none, Duration::from_secs(60), Timestamp::now());
        assert_eq!(stats.total_requests, 0);
        assert_eq!((stats.p50_ms, stats.p95_ms, stats.p99_ms), (0.0, 0.0, 0.0));
        assert!(stats.routes.is_empty());
    }

    #[test]
    fn metrics_outside_window_are_ignored() {
        let route = RouteId::new();
        let now = Timestamp::now();
        let metrics = vec![
            metric(route, "us-east", now.minus(Duration::from_secs(120)), 900.0, true),
            metric(route, "us-east", now.minus(Duration::from_secs(30)), 100.0, false),
        ];
        let stats = LoadBalancerStats::compute(&metrics, Duration::from_secs(60), now);
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 0);
        assert_eq!(stats.p99_ms, 100.0);
    }

    #[test]
    fn unbounded_window_covers_all_history() {
        let route = RouteId::new();
        let now = Timestamp::now();
        let metrics = vec![
            metric(route, "us-east", now.minus(Duration::from_secs(86_400 * 365)), 900.0, true),
            metric(route, "us-east", now, 100.0, false),
        ];
        let stats = LoadBalancerStats::compute(&metrics, Duration::MAX, now);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.failed_requests, 1);
    }

    #[test]
    fn groups_by_route_and_region() {
        let a = RouteId::new();
        let b = RouteId::new();
        let now = Timestamp::now();
        let metrics = vec![
            metric(a, "us-east", now, 100.0, false),
            metric(a, "eu-west", now, 300.0, true),
            metric(b, "us-east", now, 200.0, false),
            metric(b, "us-east", now, 400.0, true),
        ];
        let stats = LoadBalancerStats::compute(&metrics, Duration::from_secs(60), now);

        let route_a = &stats.routes[&a];
        assert_eq!(route_a.request_count, 2);
        assert_eq!(route_a.error_count, 1);
        assert_eq!(route_a.average_response_time_ms, 200.0);

        let east = &stats.regions["us-east"];
        assert_eq!(east.request_count, 3);
        assert!((east.health_score.value() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.regions["eu-west"].health_score, HealthScore::ZERO);
    }

    proptest! {
        #[test]
        fn percentile_is_an_element_of_the_input(
            mut values in proptest::collection::vec(0.0f64..10_000.0, 1..200),
            p in 0.0f64..=1.0,
        ) {
            values.sort_by(f64::total_cmp);
            let v = percentile(&values, p);
            prop_assert!(values.contains(&v));
            let idx = ((values.len() as f64) * p).floor() as usize;
            prop_assert_eq!(v, values[idx.min(values.len() - 1)]);
        }
    }
}
