//! A single request outcome observation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RouteId, Timestamp};
use crate::domain::routing::TargetKey;

/// One observed request outcome for a route's target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetric {
    pub route_id: RouteId,
    pub region: String,
    pub instance: String,
    pub timestamp: Timestamp,
    /// Never negative or NaN.
    pub response_time_ms: f64,
    pub status_code: u16,
    pub is_error: bool,
}

impl RequestMetric {
    /// Builds a metric, clamping a negative or non-finite response time to 0.
    pub fn new(
        route_id: RouteId,
        target: &TargetKey,
        timestamp: Timestamp,
        response_time_ms: f64,
        status_code: u16,
        is_error: bool,
    ) -> Self {
        let response_time_ms = if response_time_ms.is_finite() {
            response_time_ms.max(0.0)
        } else {
            0.0
        };
        Self {
            route_id,
            region: target.region.clone(),
            instance: target.instance.clone(),
            timestamp,
            response_time_ms,
            status_code,
            is_error,
        }
    }

    pub fn target_key(&self) -> TargetKey {
        TargetKey::new(&self.region, &self.instance)
    }
}
