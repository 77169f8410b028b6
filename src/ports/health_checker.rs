//! Health checker port - liveness probes against a target.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::routing::Target;

/// Bounded-duration liveness probe.
///
/// Fail-closed: a non-2xx response, a connection error and an expired
/// timeout all yield `false`. Implementations never return an error.
#[async_trait]
pub trait HealthChecker: Send + Sync {
    async fn is_healthy(&self, target: &Target, check_path: &str, timeout: Duration) -> bool;
}
