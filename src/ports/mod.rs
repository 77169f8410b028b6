//! Ports - Interfaces for the routing layer's collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## State Ports
//!
//! - `RouteRegistry` - Configured routes and path resolution
//! - `CircuitBreakerManager` - Per-route breaker state
//! - `MetricsAggregator` - Bounded outcome log and statistics
//! - `RateLimiter` - Per-route token buckets
//!
//! ## I/O Ports
//!
//! - `HealthChecker` - Liveness probes (the only port that awaits the network)
//! - `RoutingEventSink` - Notifications to external collaborators
//! - `Clock` - Injectable time source

mod circuit_breaker;
mod clock;
mod event_sink;
mod health_checker;
mod metrics_aggregator;
mod rate_limiter;
mod route_registry;

pub use circuit_breaker::CircuitBreakerManager;
pub use clock::Clock;
pub use event_sink::{NoOpEventSink, RoutingEventSink};
pub use health_checker::HealthChecker;
pub use metrics_aggregator::MetricsAggregator;
pub use rate_limiter::{RateLimitDenied, RateLimitResult, RateLimitStatus, RateLimiter};
pub use route_registry::RouteRegistry;
