//! Event sink that keeps every event in memory.

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::routing::{CircuitTransitioned, SelectorFellBack, TargetFailedOver};
use crate::ports::RoutingEventSink;

#[derive(Debug, Default)]
struct Recorded {
    transitions: Vec<CircuitTransitioned>,
    failovers: Vec<TargetFailedOver>,
    fallbacks: Vec<SelectorFellBack>,
}

/// Captures events for later inspection. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<CircuitTransitioned> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transitions
            .clone()
    }

    pub fn failovers(&self) -> Vec<TargetFailedOver> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failovers
            .clone()
    }

    pub fn fallbacks(&self) -> Vec<SelectorFellBack> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fallbacks
            .clone()
    }
}

impl RoutingEventSink for RecordingEventSink {
    fn on_circuit_transition(&self, event: CircuitTransitioned) {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transitions
            .push(event);
    }

    fn on_target_failover(&self, event: TargetFailedOver) {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failovers
            .push(event);
    }

    fn on_selector_fallback(&self, event: SelectorFellBack) {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fallbacks
            .push(event);
    }
}
