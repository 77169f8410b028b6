//! Circuit breaker domain - per-route failure gating.

mod breaker;
mod state;

pub use breaker::{Admission, CircuitBreakerSnapshot, CircuitBreakerState, CircuitTransition};
pub use state::CircuitState;
