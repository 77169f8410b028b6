//! Scoring used by the adaptive algorithm.
//!
//! The default formula, for weights `w_*` summing to any positive total:
//!
//! ```text
//! score = w_weight  * weight / max_weight
//!       + w_health  * health                      (0 if last probe failed, else 1 - error rate)
//!       + w_load    * 1 / (1 + region_in_flight)
//!       + w_latency * 1 / (1 + avg_latency_ms / 100)   (1 when no samples)
//! ```

use serde::{Deserialize, Serialize};

use super::signals::{HealthStatus, SelectionSignals};
use crate::domain::foundation::{HealthScore, ValidationError};
use crate::domain::routing::Target;

/// Everything a scorer may look at for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringInput {
    pub weight: u32,
    pub max_weight: u32,
    pub health: HealthScore,
    pub region_in_flight: u64,
    pub avg_latency_ms: Option<f64>,
}

impl ScoringInput {
    /// Gathers the inputs for `target` from a signal snapshot.
    pub fn gather(target: &Target, max_weight: u32, signals: &SelectionSignals) -> Self {
        let key = target.key();
        let health = match signals.health(&key) {
            HealthStatus::Unhealthy => HealthScore::ZERO,
            HealthStatus::Healthy | HealthStatus::Unknown => signals
                .load(&key)
                .map(|l| HealthScore::new(1.0 - l.error_rate))
                .unwrap_or(HealthScore::PERFECT),
        };
        Self {
            weight: target.weight,
            max_weight,
            health,
            region_in_flight: signals.region_in_flight(&target.region),
            avg_latency_ms: signals.avg_latency_ms(&key),
        }
    }
}

/// Swappable scoring formula. Higher is better.
pub trait AdaptiveScorer: Send + Sync {
    fn score(&self, input: &ScoringInput) -> f64;
}

/// Relative importance of each adaptive signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveWeights {
    #[serde(default = "default_weight_factor")]
    pub weight: f64,
    #[serde(default = "default_health_factor")]
    pub health: f64,
    #[serde(default = "default_load_factor")]
    pub load: f64,
    #[serde(default = "default_latency_factor")]
    pub latency: f64,
}

impl AdaptiveWeights {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let factors = [
            ("adaptive.weight", self.weight),
            ("adaptive.health", self.health),
            ("adaptive.load", self.load),
            ("adaptive.latency", self.latency),
        ];
        for (field, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::out_of_range(field, 0.0, f64::MAX, value));
            }
        }
        if factors.iter().all(|(_, v)| *v == 0.0) {
            return Err(ValidationError::invalid_format(
                "adaptive",
                "at least one factor must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for AdaptiveWeights {
    fn default() -> Self {
        Self {
            weight: default_weight_factor(),
            health: default_health_factor(),
            load: default_load_factor(),
            latency: default_latency_factor(),
        }
    }
}

fn default_weight_factor() -> f64 {
    0.3
}

fn default_health_factor() -> f64 {
    0.3
}

fn default_load_factor() -> f64 {
    0.2
}

fn default_latency_factor() -> f64 {
    0.2
}

/// Linear blend of the four signals.
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    weights: AdaptiveWeights,
}

impl WeightedScorer {
    pub fn new(weights: AdaptiveWeights) -> Self {
        Self { weights }
    }
}

impl AdaptiveScorer for WeightedScorer {
    fn score(&self, input: &ScoringInput) -> f64 {
        let weight = if input.max_weight == 0 {
            0.0
        } else {
            input.weight as f64 / input.max_weight as f64
        };
        let load = 1.0 / (1.0 + input.region_in_flight as f64);
        let latency = match input.avg_latency_ms {
            Some(ms) => 1.0 / (1.0 + ms / 100.0),
            None => 1.0,
        };
        self.weights.weight * weight
            + self.weights.health * input.health.value()
            + self.weights.load * load
            + self.weights.latency * latency
    }
}
