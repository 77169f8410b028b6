//! Per-route policies: health checks, circuit breaking and rate limiting.
//!
//! Every field has a default so partial definitions deserialize cleanly.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::ValidationError;

/// Liveness probing policy for a route's targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Period of the background health sweep.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound on a single probe.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Path appended to the target address when probing.
    #[serde(default = "default_check_path")]
    pub path: String,
}

impl HealthCheckPolicy {
    /// Policy with probing switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                "health_check.timeout_ms",
                1.0,
                u64::MAX as f64,
                0.0,
            ));
        }
        if self.interval_ms == 0 {
            return Err(ValidationError::out_of_range(
                "health_check.interval_ms",
                1.0,
                u64::MAX as f64,
                0.0,
            ));
        }
        if !self.path.starts_with('/') {
            return Err(ValidationError::invalid_format(
                "health_check.path",
                "must start with '/'",
            ));
        }
        Ok(())
    }
}

impl Default for HealthCheckPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
            path: default_check_path(),
        }
    }
}

/// Thresholds driving a route's circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Consecutive failures in closed state that open the circuit.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Consecutive half-open successes that close the circuit.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,

    /// Time the circuit stays open before allowing a trial request.
    #[serde(default = "default_open_timeout_ms")]
    pub open_timeout_ms: u64,
}

impl CircuitBreakerPolicy {
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    pub fn with_open_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.open_timeout_ms = timeout_ms;
        self
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.failure_threshold == 0 {
            return Err(ValidationError::out_of_range(
                "circuit_breaker.failure_threshold",
                1.0,
                u32::MAX as f64,
                0.0,
            ));
        }
        if self.success_threshold == 0 {
            return Err(ValidationError::out_of_range(
                "circuit_breaker.success_threshold",
                1.0,
                u32::MAX as f64,
                0.0,
            ));
        }
        Ok(())
    }
}

impl Default for CircuitBreakerPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            open_timeout_ms: default_open_timeout_ms(),
        }
    }
}

/// Token bucket limits for a route. Off unless enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    #[serde(default)]
    pub enabled: bool,

    /// Steady-state refill rate.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Bucket capacity.
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl RateLimitPolicy {
    /// Enabled policy with the given rate and burst.
    pub fn limited(requests_per_second: u32, burst: u32) -> Self {
        Self {
            enabled: true,
            requests_per_second,
            burst,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.requests_per_second == 0 {
            return Err(ValidationError::out_of_range(
                "rate_limit.requests_per_second",
                1.0,
                u32::MAX as f64,
                0.0,
            ));
        }
        if self.burst == 0 {
            return Err(ValidationError::out_of_range(
                "rate_limit.burst",
                1.0,
                u32::MAX as f64,
                0.0,
            ));
        }
        Ok(())
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    30_000
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_check_path() -> String {
    "/health".to_string()
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_success_threshold() -> u32 {
    2
}

fn default_open_timeout_ms() -> u64 {
    60_000
}

fn default_requests_per_second() -> u32 {
    100
}

fn default_burst() -> u32 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── Defaults ───

    #[test]
    fn health_check_defaults() {
        let policy = HealthCheckPolicy::default();
        assert!(policy.enabled);
        assert_eq!(policy.interval_ms, 30_000);
        assert_eq!(policy.timeout(), Duration::from_secs(5));
        assert_eq!(policy.path, "/health");
    }

    #[test]
    fn circuit_breaker_defaults() {
        let policy = CircuitBreakerPolicy::default();
        assert!(policy.enabled);
        assert_eq!(policy.failure_threshold, 5);
        assert_eq!(policy.success_threshold, 2);
        assert_eq!(policy.open_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn rate_limit_is_disabled_by_default() {
        let policy = RateLimitPolicy::default();
        assert!(!policy.enabled);
        assert_eq!(policy.requests_per_second, 100);
        assert_eq!(policy.burst, 200);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let policy: CircuitBreakerPolicy = serde_yaml::from_str("failure_threshold: 2").unwrap();
        assert_eq!(policy.failure_threshold, 2);
        assert_eq!(policy.success_threshold, 2);
        assert!(policy.enabled);
    }

    // ─── Validation ───

    #[test]
    fn zero_failure_threshold_is_rejected() {
        let policy = CircuitBreakerPolicy::default().with_failure_threshold(0);
        let err = policy.validate().unwrap_err();
        assert_eq!(err.field(), "circuit_breaker.failure_threshold");
    }

    #[test]
    fn health_path_must_be_absolute() {
        let policy = HealthCheckPolicy {
            path: "health".to_string(),
            ..HealthCheckPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn disabled_rate_limit_skips_validation() {
        let policy = RateLimitPolicy {
            enabled: false,
            requests_per_second: 0,
            burst: 0,
        };
        assert!(policy.validate().is_ok());
        assert!(RateLimitPolicy::limited(0, 10).validate().is_err());
    }
}
