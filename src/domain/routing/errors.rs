//! Routing error types.

use thiserror::Error;

use super::target::TargetKey;
use crate::domain::circuit_breaker::CircuitState;
use crate::domain::foundation::{ErrorCode, RouteId, ValidationError};

/// Errors surfaced to callers of the routing layer.
///
/// Every variant tied to a route carries its id so operators can diagnose a
/// failure without another lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("Route {route_id} not found")]
    NotFound { route_id: RouteId },

    #[error("No route matches {method} {path}")]
    NoMatchingRoute { method: String, path: String },

    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error(
        "Circuit {state} for route {route_id} after {consecutive_failures} consecutive failures; retry in {retry_after_ms}ms"
    )]
    CircuitOpen {
        route_id: RouteId,
        state: CircuitState,
        consecutive_failures: u32,
        retry_after_ms: u64,
    },

    #[error("No healthy target for route {route_id} ({} probed)", .attempted.len())]
    NoHealthyTarget {
        route_id: RouteId,
        attempted: Vec<TargetKey>,
    },

    #[error("Route {route_id} is rate limited; retry in {retry_after_ms}ms")]
    RateLimited { route_id: RouteId, retry_after_ms: u64 },
}

impl RoutingError {
    pub fn not_found(route_id: RouteId) -> Self {
        RoutingError::NotFound { route_id }
    }

    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RoutingError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable code for logs and operator tooling.
    pub fn code(&self) -> ErrorCode {
        match self {
            RoutingError::NotFound { .. } | RoutingError::NoMatchingRoute { .. } => {
                ErrorCode::RouteNotFound
            }
            RoutingError::InvalidConfiguration { .. } => ErrorCode::InvalidConfiguration,
            RoutingError::CircuitOpen { .. } => ErrorCode::CircuitOpen,
            RoutingError::NoHealthyTarget { .. } => ErrorCode::NoHealthyTarget,
            RoutingError::RateLimited { .. } => ErrorCode::RateLimited,
        }
    }

    /// Route the error refers to, if any.
    pub fn route_id(&self) -> Option<RouteId> {
        match self {
            RoutingError::NotFound { route_id }
            | RoutingError::CircuitOpen { route_id, .. }
            | RoutingError::NoHealthyTarget { route_id, .. }
            | RoutingError::RateLimited { route_id, .. } => Some(*route_id),
            RoutingError::NoMatchingRoute { .. } | RoutingError::InvalidConfiguration { .. } => {
                None
            }
        }
    }
}

impl From<ValidationError> for RoutingError {
    fn from(err: ValidationError) -> Self {
        RoutingError::InvalidConfiguration {
            field: err.field().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Internal selector failures.
///
/// Never returned to callers; the selector downgrades them to round-robin.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("candidate pool is empty")]
    EmptyPool,

    #[error("no latency samples for any candidate")]
    NoMetrics,

    #[error("caller location is missing or not in the region table")]
    UnknownLocation,

    #[error("no candidate region has a configured cost")]
    NoCostConfigured,

    #[error("no routing rule matched the request")]
    NoRuleMatched,

    #[error("score for candidate {index} is not finite")]
    NonFiniteScore { index: usize },
}

impl SelectionError {
    /// True for misses that routine inputs produce (no samples yet, no rule
    /// for this request). False for faults worth reporting.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            SelectionError::NoMetrics
                | SelectionError::UnknownLocation
                | SelectionError::NoCostConfigured
                | SelectionError::NoRuleMatched
        )
    }
}
