//! Concrete backend endpoints a route may dispatch to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (region, instance) endpoint with a relative weight.
///
/// Targets are only ever addressed through a route's candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Region code, e.g. `us-east`.
    pub region: String,
    /// Host or `host:port` of the instance.
    pub instance: String,
    /// Relative weight used by the adaptive scorer.
    #[serde(default = "default_weight")]
    pub weight: u32,
    /// URL scheme used for dispatch and probes.
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

impl Target {
    /// Creates a target with weight 1 over plain HTTP.
    pub fn new(region: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance: instance.into(),
            weight: default_weight(),
            scheme: default_scheme(),
        }
    }

    /// Sets the relative weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the URL scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Identity of the physical endpoint, independent of weight or scheme.
    pub fn key(&self) -> TargetKey {
        TargetKey::new(&self.region, &self.instance)
    }

    /// Builds `{scheme}://{instance}{path}`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.instance, path)
    }
}

fn default_weight() -> u32 {
    1
}

fn default_scheme() -> String {
    "http".to_string()
}

/// Hashable identity of a target: its region and instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetKey {
    pub region: String,
    pub instance: String,
}

impl TargetKey {
    pub fn new(region: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance: instance.into(),
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_target_has_unit_weight_and_http() {
        let target = Target::new("us-east", "10.0.0.1:8080");
        assert_eq!(target.weight, 1);
        assert_eq!(target.scheme, "http");
    }

    #[test]
    fn url_for_joins_scheme_instance_and_path() {
        let target = Target::new("eu-west", "api-1.internal").with_scheme("https");
        assert_eq!(target.url_for("/health"), "https://api-1.internal/health");
    }

    #[test]
    fn key_ignores_weight() {
        let a = Target::new("us-east", "a").with_weight(5);
        let b = Target::new("us-east", "a");
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "us-east/a");
    }

    #[test]
    fn deserializes_with_defaults() {
        let target: Target =
            serde_json::from_str(r#"{"region":"ap-south","instance":"x:1"}"#).unwrap();
        assert_eq!(target.weight, 1);
        assert_eq!(target.scheme, "http");
    }
}
