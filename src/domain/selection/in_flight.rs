//! In-flight request counters per target.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::routing::TargetKey;

/// Counts requests dispatched to each target and not yet reported back.
///
/// Counters are keyed by endpoint, so routes sharing an instance share its
/// count. The map lock is only taken for writing when a target is first seen.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    counters: RwLock<HashMap<TargetKey, Arc<AtomicU64>>>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a dispatch to `key`.
    pub fn acquire(&self, key: &TargetKey) {
        self.counter(key).fetch_add(1, Ordering::Relaxed);
    }

    /// Marks a completion. Never drops below zero.
    pub fn release(&self, key: &TargetKey) {
        let Some(counter) = self.existing(key) else {
            return;
        };
        let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn get(&self, key: &TargetKey) -> u64 {
        self.existing(key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Current counts for the given targets.
    pub fn snapshot<'a, I>(&self, keys: I) -> HashMap<TargetKey, u64>
    where
        I: IntoIterator<Item = &'a TargetKey>,
    {
        let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        keys.into_iter()
            .map(|k| {
                let count = counters.get(k).map(|c| c.load(Ordering::Relaxed)).unwrap_or(0);
                (k.clone(), count)
            })
            .collect()
    }

    fn existing(&self, key: &TargetKey) -> Option<Arc<AtomicU64>> {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn counter(&self, key: &TargetKey) -> Arc<AtomicU64> {
        if let Some(counter) = self.existing(key) {
            return counter;
        }
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone()
    }
}
