//! Latest probe result per target.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::Timestamp;
use crate::domain::routing::TargetKey;
use crate::domain::selection::HealthStatus;

/// Outcome of the most recent probe of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthRecord {
    pub status: HealthStatus,
    pub checked_at: Timestamp,
}

/// Shared table of probe results, written by dispatch-time probes and the
/// background sweep.
///
/// Keyed by endpoint: routes sharing an instance share its record.
#[derive(Debug, Default)]
pub struct HealthBoard {
    records: RwLock<HashMap<TargetKey, HealthRecord>>,
}

impl HealthBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: TargetKey, healthy: bool, checked_at: Timestamp) {
        let record = HealthRecord {
            status: HealthStatus::from_probe(healthy),
            checked_at,
        };
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, record);
    }

    pub fn get(&self, key: &TargetKey) -> Option<HealthRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    /// `Unknown` for never-probed targets.
    pub fn status(&self, key: &TargetKey) -> HealthStatus {
        self.get(key).map(|r| r.status).unwrap_or_default()
    }

    /// Statuses of the given targets.
    pub fn snapshot<'a, I>(&self, keys: I) -> HashMap<TargetKey, HealthStatus>
    where
        I: IntoIterator<Item = &'a TargetKey>,
    {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        keys.into_iter()
            .map(|k| {
                let status = records.get(k).map(|r| r.status).unwrap_or_default();
                (k.clone(), status)
            })
            .collect()
    }

    /// Fraction of probed `targets` in `region` whose last probe passed.
    ///
    /// Records for endpoints outside `targets` are ignored. `None` when no
    /// such target in the region has been probed.
    pub fn region_healthy_fraction(&self, region: &str, targets: &HashSet<TargetKey>) -> Option<f64> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let (probed, healthy) = records
            .iter()
            .filter(|(key, _)| key.region == region && targets.contains(*key))
            .fold((0u32, 0u32), |(probed, healthy), (_, record)| match record.status {
                HealthStatus::Healthy => (probed + 1, healthy + 1),
                HealthStatus::Unhealthy => (probed + 1, healthy),
                HealthStatus::Unknown => (probed, healthy),
            });
        (probed > 0).then(|| f64::from(healthy) / f64::from(probed))
    }
}
