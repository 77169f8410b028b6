//! Selection algorithm kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Closed set of target selection algorithms a route may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgorithm {
    /// Cycle through candidates in registration order.
    RoundRobin,
    /// Fewest in-flight requests wins.
    LeastConnections,
    /// Nearest region to the caller's location.
    Geographic,
    /// Lowest recent average response time.
    LatencyBased,
    /// Cheapest configured region cost.
    CostBased,
    /// User id or preference mapped to a region.
    UserBased,
    /// Request path or header mapped to a region.
    ContentBased,
    /// Blended load, health and weight score.
    #[default]
    #[serde(alias = "optimized", alias = "ai_optimized")]
    Adaptive,
}

impl RoutingAlgorithm {
    /// Every algorithm, in declaration order.
    pub const ALL: [RoutingAlgorithm; 8] = [
        RoutingAlgorithm::RoundRobin,
        RoutingAlgorithm::LeastConnections,
        RoutingAlgorithm::Geographic,
        RoutingAlgorithm::LatencyBased,
        RoutingAlgorithm::CostBased,
        RoutingAlgorithm::UserBased,
        RoutingAlgorithm::ContentBased,
        RoutingAlgorithm::Adaptive,
    ];

    /// Returns the configuration name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingAlgorithm::RoundRobin => "round_robin",
            RoutingAlgorithm::LeastConnections => "least_connections",
            RoutingAlgorithm::Geographic => "geographic",
            RoutingAlgorithm::LatencyBased => "latency_based",
            RoutingAlgorithm::CostBased => "cost_based",
            RoutingAlgorithm::UserBased => "user_based",
            RoutingAlgorithm::ContentBased => "content_based",
            RoutingAlgorithm::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for RoutingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingAlgorithm {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "optimized" | "ai_optimized" => return Ok(RoutingAlgorithm::Adaptive),
            _ => {}
        }
        RoutingAlgorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "algorithm",
                    format!("unknown routing algorithm '{}'", s),
                )
            })
    }
}
