//! In-memory token bucket rate limiter.
//!
//! One bucket per route, each behind its own mutex. A bucket refills at
//! `requests_per_second` up to `burst` tokens.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::foundation::{RouteId, Timestamp};
use crate::domain::routing::RateLimitPolicy;
use crate::ports::{Clock, RateLimitDenied, RateLimitResult, RateLimitStatus, RateLimiter};

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Timestamp,
}

impl TokenBucket {
    fn full(policy: &RateLimitPolicy, now: Timestamp) -> Self {
        Self {
            tokens: policy.burst as f64,
            last_refill: now,
        }
    }

    fn refill(&mut self, policy: &RateLimitPolicy, now: Timestamp) {
        let elapsed = now.elapsed_since(&self.last_refill).as_secs_f64();
        self.tokens =
            (self.tokens + elapsed * policy.requests_per_second as f64).min(policy.burst as f64);
        if now.is_after(&self.last_refill) {
            self.last_refill = now;
        }
    }

    fn status(&self, policy: &RateLimitPolicy) -> RateLimitStatus {
        RateLimitStatus {
            limit: policy.burst,
            remaining: self.tokens.max(0.0).floor() as u32,
        }
    }
}

/// Token bucket limiter for single-process deployments.
pub struct InMemoryRateLimiter {
    buckets: RwLock<HashMap<RouteId, Arc<Mutex<TokenBucket>>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn bucket(&self, route_id: &RouteId, policy: &RateLimitPolicy, now: Timestamp) -> Arc<Mutex<TokenBucket>> {
        if let Some(bucket) = self
            .buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route_id)
        {
            return Arc::clone(bucket);
        }
        Arc::clone(
            self.buckets
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(*route_id)
                .or_insert_with(|| Arc::new(Mutex::new(TokenBucket::full(policy, now)))),
        )
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, route_id: &RouteId, policy: &RateLimitPolicy) -> RateLimitResult {
        if !policy.enabled {
            return RateLimitResult::Allowed(RateLimitStatus {
                limit: policy.burst,
                remaining: policy.burst,
            });
        }

        let now = self.clock.now();
        let bucket = self.bucket(route_id, policy, now);
        let mut bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket.refill(policy, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return RateLimitResult::Allowed(bucket.status(policy));
        }

        let missing = 1.0 - bucket.tokens;
        let rate = policy.requests_per_second.max(1) as f64;
        RateLimitResult::Denied(RateLimitDenied {
            limit: policy.burst,
            retry_after_ms: ((missing / rate) * 1000.0).ceil() as u64,
        })
    }

    async fn status(&self, route_id: &RouteId, policy: &RateLimitPolicy) -> RateLimitStatus {
        let now = self.clock.now();
        let existing = self
            .buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route_id)
            .cloned();
        match existing {
            Some(bucket) => {
                let mut bucket = bucket.lock().unwrap_or_else(PoisonError::into_inner);
                bucket.refill(policy, now);
                bucket.status(policy)
            }
            None => TokenBucket::full(policy, now).status(policy),
        }
    }

    async fn reset(&self, route_id: &RouteId) {
        self.buckets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(route_id);
    }
}
