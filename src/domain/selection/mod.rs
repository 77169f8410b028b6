//! Selection domain - choosing a target from a route's candidate pool.

pub mod algorithms;
mod in_flight;
mod scorer;
mod selector;
mod signals;

pub use algorithms::{Candidates, Pick};
pub use in_flight::InFlightTracker;
pub use scorer::{AdaptiveScorer, AdaptiveWeights, ScoringInput, WeightedScorer};
pub use selector::{Selection, TargetSelector};
pub use signals::{HealthStatus, SelectionSignals};
