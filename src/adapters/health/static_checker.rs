//! Scripted health checker for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::domain::routing::{Target, TargetKey};
use crate::ports::HealthChecker;

/// Answers probes from a settable table. Unlisted targets are healthy.
///
/// Every probe is recorded so tests can assert on what was checked.
#[derive(Debug, Clone, Default)]
pub struct StaticHealthChecker {
    verdicts: Arc<Mutex<HashMap<TargetKey, bool>>>,
    probes: Arc<Mutex<Vec<TargetKey>>>,
}

impl StaticHealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(self, key: TargetKey, healthy: bool) -> Self {
        self.set(key, healthy);
        self
    }

    pub fn set(&self, key: TargetKey, healthy: bool) {
        self.verdicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, healthy);
    }

    /// Targets probed so far, in order.
    pub fn probes(&self) -> Vec<TargetKey> {
        self.probes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HealthChecker for StaticHealthChecker {
    async fn is_healthy(&self, target: &Target, _check_path: &str, _timeout: Duration) -> bool {
        let key = target.key();
        let verdict = self
            .verdicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
            .unwrap_or(true);
        self.probes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key);
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unlisted_targets_are_healthy_and_probes_are_recorded() {
        let down = Target::new("eu-west", "10.0.0.2:80");
        let checker = StaticHealthChecker::new().with(down.key(), false);
        let up = Target::new("us-east", "10.0.0.1:80");

        assert!(checker.is_healthy(&up, "/health", Duration::from_secs(1)).await);
        assert!(!checker.is_healthy(&down, "/health", Duration::from_secs(1)).await);
        assert_eq!(checker.probes(), vec![up.key(), down.key()]);
    }
}
