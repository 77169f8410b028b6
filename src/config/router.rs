//! Routing engine configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::selection::AdaptiveWeights;

/// Sizing and timing of the routing engine
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Maximum outcomes kept in the metrics ring
    #[serde(default = "default_metrics_capacity")]
    pub metrics_capacity: usize,

    /// Default window for `GetStats`
    #[serde(default = "default_stats_window_secs")]
    pub stats_window_secs: u64,

    /// How far back latency and error-rate signals look
    #[serde(default = "default_latency_window_secs")]
    pub latency_window_secs: u64,

    /// Run the background health sweep
    #[serde(default = "default_true")]
    pub health_sweep_enabled: bool,

    /// Tick of the background health sweep
    #[serde(default = "default_health_sweep_interval_ms")]
    pub health_sweep_interval_ms: u64,

    /// YAML file of routes to register at startup
    #[serde(default)]
    pub routes_file: Option<PathBuf>,

    /// Coefficients of the adaptive score
    #[serde(default)]
    pub adaptive: AdaptiveWeights,
}

impl RouterConfig {
    pub fn stats_window(&self) -> Duration {
        Duration::from_secs(self.stats_window_secs)
    }

    pub fn latency_window(&self) -> Duration {
        Duration::from_secs(self.latency_window_secs)
    }

    pub fn health_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.health_sweep_interval_ms)
    }

    /// Validate router configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.metrics_capacity == 0 {
            return Err(ValidationError::InvalidMetricsCapacity);
        }
        if self.stats_window_secs == 0 {
            return Err(ValidationError::InvalidStatsWindow);
        }
        if self.latency_window_secs == 0 {
            return Err(ValidationError::InvalidLatencyWindow);
        }
        if self.health_sweep_enabled && self.health_sweep_interval_ms == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        if let Some(path) = &self.routes_file {
            if !path.is_file() {
                return Err(ValidationError::RoutesFileMissing(path.clone()));
            }
        }
        self.adaptive
            .validate()
            .map_err(|e| ValidationError::InvalidAdaptiveWeights(e.to_string()))
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            metrics_capacity: default_metrics_capacity(),
            stats_window_secs: default_stats_window_secs(),
            latency_window_secs: default_latency_window_secs(),
            health_sweep_enabled: true,
            health_sweep_interval_ms: default_health_sweep_interval_ms(),
            routes_file: None,
            adaptive: AdaptiveWeights::default(),
        }
    }
}

fn default_metrics_capacity() -> usize {
    100_000
}

fn default_stats_window_secs() -> u64 {
    3600
}

fn default_latency_window_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_health_sweep_interval_ms() -> u64 {
    30_000
}
