//! Foundation module - Shared domain primitives.
//!
//! Value objects, identifiers and error types that form the vocabulary of
//! the routing layer.

mod errors;
mod health_score;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use health_score::HealthScore;
pub use ids::RouteId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
