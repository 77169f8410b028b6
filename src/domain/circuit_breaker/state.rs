//! Circuit breaker states and their legal transitions.
//!
//! ```text
//! Closed   --[failure_threshold consecutive failures]--> Open
//! Open     --[open_timeout elapsed, checked lazily]-->  HalfOpen
//! HalfOpen --[success_threshold consecutive successes]--> Closed
//! HalfOpen --[any failure]--> Open
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Circuit breaker states for a single route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - all traffic permitted.
    #[default]
    Closed,

    /// Too many failures - traffic rejected without selection or probing.
    Open,

    /// Trial traffic permitted to test recovery.
    HalfOpen,
}

impl CircuitState {
    /// Check if the circuit allows requests through.
    pub fn allows_requests(&self) -> bool {
        matches!(self, CircuitState::Closed | CircuitState::HalfOpen)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for CircuitState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CircuitState::*;
        matches!(
            (self, target),
            (Closed, Open) | (Open, HalfOpen) | (HalfOpen, Closed) | (HalfOpen, Open)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CircuitState::*;
        match self {
            Closed => vec![Open],
            Open => vec![HalfOpen],
            HalfOpen => vec![Closed, Open],
        }
    }
}
