//! Rate limiting port for protecting routes from bursts.
//!
//! This port defines the interface for per-route rate limiting using a
//! token bucket. Each route's bucket is independent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::RouteId;
use crate::domain::routing::RateLimitPolicy;

/// Port for rate limiting operations.
///
/// Implementations should be thread-safe and support concurrent access.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if a request on the route is allowed, consuming a token if so.
    async fn check(&self, route_id: &RouteId, policy: &RateLimitPolicy) -> RateLimitResult;

    /// Current bucket status without consuming a token.
    async fn status(&self, route_id: &RouteId, policy: &RateLimitPolicy) -> RateLimitStatus;

    /// Drops the route's bucket, restoring full quota on next use.
    async fn reset(&self, route_id: &RouteId);
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed(RateLimitStatus),
    /// Request is denied.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }
}

/// Current quota of a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    /// Bucket capacity.
    pub limit: u32,
    /// Whole tokens left.
    pub remaining: u32,
}

/// Information about a denied request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitDenied {
    pub limit: u32,
    /// Time until one token is available.
    pub retry_after_ms: u64,
}
