//! HealthSweep - periodic background liveness probing.
//!
//! Probes every target of every health-enabled route concurrently and
//! writes the results to the [`HealthBoard`]. A target is skipped while its
//! last probe is fresher than its route's `interval_ms` allows.
//!
//! ## Graceful Shutdown
//!
//! The sweep listens on a `watch` channel and stops after the current
//! round when `true` is sent or the sender is dropped.

use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use super::health_board::HealthBoard;
use crate::domain::routing::{Target, TargetKey};
use crate::ports::{Clock, HealthChecker, RouteRegistry};

/// Counts from one sweep round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub probed: usize,
    pub unhealthy: usize,
}

struct Probe {
    target: Target,
    path: String,
    timeout: Duration,
}

/// Background prober.
pub struct HealthSweep {
    registry: Arc<dyn RouteRegistry>,
    checker: Arc<dyn HealthChecker>,
    board: Arc<HealthBoard>,
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl HealthSweep {
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        checker: Arc<dyn HealthChecker>,
        board: Arc<HealthBoard>,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            checker,
            board,
            clock,
            period,
        }
    }

    /// Run sweeps until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Health sweep stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    let summary = self.sweep_once().await;
                    tracing::debug!(probed = summary.probed, unhealthy = summary.unhealthy, "Health sweep finished");
                }
            }
        }
    }

    /// Probe every due target once.
    pub async fn sweep_once(&self) -> SweepSummary {
        let probes = self.due_probes();
        let checker = &self.checker;
        let results = join_all(probes.iter().map(|p| async move {
            checker.is_healthy(&p.target, &p.path, p.timeout).await
        }))
        .await;

        let now = self.clock.now();
        let mut summary = SweepSummary::default();
        for (probe, healthy) in probes.iter().zip(results) {
            summary.probed += 1;
            if !healthy {
                summary.unhealthy += 1;
            }
            self.board.record(probe.target.key(), healthy, now);
        }
        summary
    }

    /// One probe per (endpoint, check path), for targets whose last probe
    /// is older than their route's interval less half a sweep period.
    fn due_probes(&self) -> Vec<Probe> {
        let now = self.clock.now();
        let slack = self.period / 2;
        let mut seen: HashSet<(TargetKey, String)> = HashSet::new();
        let mut probes = Vec::new();

        for route in self.registry.list() {
            let policy = &route.health_check;
            if !policy.enabled {
                continue;
            }
            let min_age = policy.interval().saturating_sub(slack);
            for target in &route.targets {
                let key = target.key();
                let fresh = self
                    .board
                    .get(&key)
                    .is_some_and(|r| now.elapsed_since(&r.checked_at) < min_age);
                if fresh || !seen.insert((key, policy.path.clone())) {
                    continue;
                }
                probes.push(Probe {
                    target: target.clone(),
                    path: policy.path.clone(),
                    timeout: policy.timeout(),
                });
            }
        }
        probes
    }
}
