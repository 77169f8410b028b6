//! In-memory inputs the selection algorithms read.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::metrics::TargetLoad;
use crate::domain::routing::TargetKey;

/// Outcome of the latest liveness probe for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    /// Never probed.
    #[default]
    Unknown,
}

impl HealthStatus {
    pub fn from_probe(healthy: bool) -> Self {
        if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

/// Snapshot of per-target signals taken before a selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionSignals {
    pub loads: HashMap<TargetKey, TargetLoad>,
    pub in_flight: HashMap<TargetKey, u64>,
    pub health: HashMap<TargetKey, HealthStatus>,
}

impl SelectionSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, key: &TargetKey) -> Option<&TargetLoad> {
        self.loads.get(key)
    }

    /// Recent average latency, if the target has samples.
    pub fn avg_latency_ms(&self, key: &TargetKey) -> Option<f64> {
        self.load(key).and_then(|l| l.avg_latency_ms)
    }

    pub fn in_flight(&self, key: &TargetKey) -> u64 {
        self.in_flight.get(key).copied().unwrap_or(0)
    }

    /// Sum of in-flight requests over every known target in a region.
    pub fn region_in_flight(&self, region: &str) -> u64 {
        self.in_flight
            .iter()
            .filter(|(key, _)| key.region == region)
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn health(&self, key: &TargetKey) -> HealthStatus {
        self.health.get(key).copied().unwrap_or_default()
    }

    pub fn with_load(mut self, key: TargetKey, load: TargetLoad) -> Self {
        self.loads.insert(key, load);
        self
    }

    pub fn with_in_flight(mut self, key: TargetKey, count: u64) -> Self {
        self.in_flight.insert(key, count);
        self
    }

    pub fn with_health(mut self, key: TargetKey, status: HealthStatus) -> Self {
        self.health.insert(key, status);
        self
    }
}
