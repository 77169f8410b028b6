//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Log filter directive must not be empty")]
    EmptyLogLevel,

    #[error("Metrics capacity must be greater than zero")]
    InvalidMetricsCapacity,

    #[error("Stats window must be greater than zero")]
    InvalidStatsWindow,

    #[error("Latency window must be greater than zero")]
    InvalidLatencyWindow,

    #[error("Health sweep interval must be greater than zero")]
    InvalidSweepInterval,

    #[error("Invalid adaptive weights: {0}")]
    InvalidAdaptiveWeights(String),

    #[error("Routes file not found: {0}")]
    RoutesFileMissing(PathBuf),
}
