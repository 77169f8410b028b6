//! State machine trait for status enums.
//!
//! Gives status enums a single place to declare their legal transitions so
//! mutating code can check a move before making it.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for CircuitState {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Closed, Open) | (Open, HalfOpen) | ...)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> { ... }
/// }
///
/// let next = CircuitState::Closed.transition_to(CircuitState::Open)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
