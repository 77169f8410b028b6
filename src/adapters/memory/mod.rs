//! In-memory adapters for routing state.

mod circuit_breaker;
mod metrics;
mod rate_limiter;
mod route_registry;

pub use circuit_breaker::InMemoryCircuitBreakerManager;
pub use metrics::RingBufferMetricsAggregator;
pub use rate_limiter::InMemoryRateLimiter;
pub use route_registry::InMemoryRouteRegistry;
