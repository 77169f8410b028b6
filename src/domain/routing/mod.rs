//! Routing domain - routes, targets, policies and request hints.

mod algorithm;
mod context;
mod errors;
mod events;
pub mod geography;
mod path;
mod policy;
mod route;
mod rules;
mod target;

pub use algorithm::RoutingAlgorithm;
pub use context::{RequestContext, UserLocation};
pub use errors::{RoutingError, SelectionError};
pub use events::{CircuitTransitioned, SelectorFellBack, TargetFailedOver};
pub use path::PathPattern;
pub use policy::{CircuitBreakerPolicy, HealthCheckPolicy, RateLimitPolicy};
pub use route::{Route, RouteDefinition, RoutePolicyUpdate};
pub use rules::{ContentRule, HeaderMatch, RoutingRules};
pub use target::{Target, TargetKey};
