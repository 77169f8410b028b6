//! Adapters - Implementations of the routing ports.
//!
//! - `memory` - Route registry, breakers, metrics ring and rate limiter
//! - `health` - HTTP liveness probes and a scripted checker
//! - `events` - Tracing and recording event sinks
//! - `clock` - System and mock clocks
//! - `route_file` - YAML route definitions

pub mod clock;
pub mod events;
pub mod health;
pub mod memory;
pub mod route_file;

pub use clock::{MockClock, SystemClock};
pub use events::{RecordingEventSink, TracingEventSink};
pub use health::{HttpHealthChecker, StaticHealthChecker};
pub use memory::{
    InMemoryCircuitBreakerManager, InMemoryRateLimiter, InMemoryRouteRegistry,
    RingBufferMetricsAggregator,
};
pub use route_file::{load_routes_file, parse_routes, RouteFileError};
