//! Route aggregate - a (path, method) mapping to a pool of candidate targets.

use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::algorithm::RoutingAlgorithm;
use super::errors::RoutingError;
use super::path::PathPattern;
use super::policy::{CircuitBreakerPolicy, HealthCheckPolicy, RateLimitPolicy};
use super::rules::RoutingRules;
use super::target::{Target, TargetKey};
use crate::domain::foundation::{RouteId, Timestamp, ValidationError};

/// A configured route.
///
/// Identity (`id`, `path`, `method`) is fixed at creation. Policies, rules,
/// algorithm and target weights may change through [`RoutePolicyUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub path: PathPattern,
    #[serde(with = "method_serde")]
    pub method: Method,
    pub targets: Vec<Target>,
    pub algorithm: RoutingAlgorithm,
    pub health_check: HealthCheckPolicy,
    pub circuit_breaker: CircuitBreakerPolicy,
    pub rate_limit: RateLimitPolicy,
    pub rules: RoutingRules,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Route {
    /// Validates a definition and assigns a fresh id.
    pub fn create(def: RouteDefinition, now: Timestamp) -> Result<Self, RoutingError> {
        let path = PathPattern::parse(def.path)?;
        let method = parse_method(def.method.as_deref())?;
        let algorithm = match def.algorithm.as_deref() {
            Some(name) => name.parse::<RoutingAlgorithm>()?,
            None => RoutingAlgorithm::default(),
        };

        validate_targets(&def.targets)?;
        def.health_check.validate()?;
        def.circuit_breaker.validate()?;
        def.rate_limit.validate()?;
        validate_rules(&def.rules)?;

        Ok(Self {
            id: RouteId::new(),
            path,
            method,
            targets: def.targets,
            algorithm,
            health_check: def.health_check,
            circuit_breaker: def.circuit_breaker,
            rate_limit: def.rate_limit,
            rules: def.rules,
            created_at: now,
            updated_at: now,
        })
    }

    /// True if this route serves the given method and concrete path.
    pub fn serves(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.path.matches(path)
    }

    /// Position of a target in the candidate list.
    pub fn target_index(&self, key: &TargetKey) -> Option<usize> {
        self.targets.iter().position(|t| t.key() == *key)
    }

    /// URL the data plane should call for the chosen target.
    pub fn dispatch_url(&self, target: &Target) -> String {
        target.url_for(self.path.as_str())
    }

    /// Applies a policy change, validating everything before mutating.
    pub fn apply(&mut self, update: RoutePolicyUpdate, now: Timestamp) -> Result<(), RoutingError> {
        if let Some(policy) = &update.health_check {
            policy.validate()?;
        }
        if let Some(policy) = &update.circuit_breaker {
            policy.validate()?;
        }
        if let Some(policy) = &update.rate_limit {
            policy.validate()?;
        }
        if let Some(rules) = &update.rules {
            validate_rules(rules)?;
        }
        for (key, _) in &update.weights {
            if self.target_index(key).is_none() {
                return Err(RoutingError::invalid_configuration(
                    "weights",
                    format!("target {} is not a candidate of this route", key),
                ));
            }
        }

        if let Some(algorithm) = update.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(policy) = update.health_check {
            self.health_check = policy;
        }
        if let Some(policy) = update.circuit_breaker {
            self.circuit_breaker = policy;
        }
        if let Some(policy) = update.rate_limit {
            self.rate_limit = policy;
        }
        if let Some(rules) = update.rules {
            self.rules = rules;
        }
        for (key, weight) in update.weights {
            if let Some(idx) = self.target_index(&key) {
                self.targets[idx].weight = weight;
            }
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Route definition as supplied at creation time.
///
/// Deserializable so routes can be declared in files; the algorithm stays a
/// string until validation so unknown names surface as configuration errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub path: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub health_check: HealthCheckPolicy,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerPolicy,
    #[serde(default)]
    pub rate_limit: RateLimitPolicy,
    #[serde(default)]
    pub rules: RoutingRules,
}

impl RouteDefinition {
    /// A GET route with default policies.
    pub fn new(path: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            path: path.into(),
            method: None,
            targets,
            algorithm: None,
            health_check: HealthCheckPolicy::default(),
            circuit_breaker: CircuitBreakerPolicy::default(),
            rate_limit: RateLimitPolicy::default(),
            rules: RoutingRules::default(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method.as_str().to_string());
        self
    }

    pub fn with_algorithm(mut self, algorithm: RoutingAlgorithm) -> Self {
        self.algorithm = Some(algorithm.as_str().to_string());
        self
    }

    pub fn with_health_check(mut self, policy: HealthCheckPolicy) -> Self {
        self.health_check = policy;
        self
    }

    pub fn with_circuit_breaker(mut self, policy: CircuitBreakerPolicy) -> Self {
        self.circuit_breaker = policy;
        self
    }

    pub fn with_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    pub fn with_rules(mut self, rules: RoutingRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Partial update of a route's mutable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePolicyUpdate {
    pub algorithm: Option<RoutingAlgorithm>,
    pub health_check: Option<HealthCheckPolicy>,
    pub circuit_breaker: Option<CircuitBreakerPolicy>,
    pub rate_limit: Option<RateLimitPolicy>,
    pub rules: Option<RoutingRules>,
    /// New weights for existing candidates.
    pub weights: Vec<(TargetKey, u32)>,
}

fn parse_method(raw: Option<&str>) -> Result<Method, RoutingError> {
    let Some(raw) = raw else {
        return Ok(Method::GET);
    };
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes()).map_err(|_| {
        RoutingError::invalid_configuration("method", format!("'{}' is not an HTTP method", raw))
    })
}

fn validate_targets(targets: &[Target]) -> Result<(), ValidationError> {
    if targets.is_empty() {
        return Err(ValidationError::empty_field("targets"));
    }
    let mut seen = HashSet::with_capacity(targets.len());
    for target in targets {
        if target.region.trim().is_empty() {
            return Err(ValidationError::empty_field("targets.region"));
        }
        if target.instance.trim().is_empty() {
            return Err(ValidationError::empty_field("targets.instance"));
        }
        if !seen.insert(target.key()) {
            return Err(ValidationError::invalid_format(
                "targets",
                format!("duplicate target {}", target.key()),
            ));
        }
    }
    Ok(())
}

fn validate_rules(rules: &RoutingRules) -> Result<(), ValidationError> {
    for (region, cost) in &rules.region_costs {
        if !cost.is_finite() || *cost < 0.0 {
            return Err(ValidationError::invalid_format(
                "rules.region_costs",
                format!("cost for '{}' must be a non-negative number", region),
            ));
        }
    }
    Ok(())
}

mod method_serde {
    use http::Method;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn targets() -> Vec<Target> {
        vec![
            Target::new("us-east", "10.0.0.1:8080"),
            Target::new("eu-west", "10.0.1.1:8080"),
        ]
    }

    // ─── Creation ───

    #[test]
    fn create_applies_defaults() {
        let route = Route::create(RouteDefinition::new("/api/users", targets()), Timestamp::now()).unwrap();
        assert_eq!(route.method, Method::GET);
        assert_eq!(route.algorithm, RoutingAlgorithm::Adaptive);
        assert!(route.health_check.enabled);
        assert_eq!(route.created_at, route.updated_at);
    }

    #[test]
    fn empty_target_list_is_invalid_configuration() {
        let err = Route::create(RouteDefinition::new("/x", vec![]), Timestamp::now()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn unknown_algorithm_is_invalid_configuration() {
        let mut def = RouteDefinition::new("/x", targets());
        def.algorithm = Some("fastest".to_string());
        let err = Route::create(def, Timestamp::now()).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::InvalidConfiguration { ref field, .. } if field == "algorithm"
        ));
    }

    #[test]
    fn duplicate_targets_are_rejected() {
        let dup = vec![Target::new("us-east", "a"), Target::new("us-east", "a").with_weight(3)];
        assert!(Route::create(RouteDefinition::new("/x", dup), Timestamp::now()).is_err());
    }

    #[test]
    fn method_is_parsed_case_insensitively() {
        let mut def = RouteDefinition::new("/x", targets());
        def.method = Some("post".to_string());
        let route = Route::create(def, Timestamp::now()).unwrap();
        assert_eq!(route.method, Method::POST);

        let mut bad = RouteDefinition::new("/x", targets());
        bad.method = Some("GE T".to_string());
        assert!(Route::create(bad, Timestamp::now()).is_err());
    }

    #[test]
    fn negative_region_cost_is_rejected() {
        let def = RouteDefinition::new("/x", targets())
            .with_rules(RoutingRules::default().with_region_cost("us-east", -1.0));
        assert!(Route::create(def, Timestamp::now()).is_err());
    }

    // ─── Dispatch ───

    #[test]
    fn dispatch_url_uses_route_path() {
        let route = Route::create(RouteDefinition::new("/api/users/:id", targets()), Timestamp::now()).unwrap();
        assert_eq!(
            route.dispatch_url(&route.targets[1]),
            "http://10.0.1.1:8080/api/users/:id"
        );
    }

    #[test]
    fn serves_checks_method_and_path() {
        let route = Route::create(RouteDefinition::new("/api/*", targets()), Timestamp::now()).unwrap();
        assert!(route.serves(&Method::GET, "/api/a/b"));
        assert!(!route.serves(&Method::POST, "/api/a/b"));
    }

    // ─── Updates ───

    #[test]
    fn apply_updates_policies_and_weights() {
        let created = Timestamp::now();
        let mut route = Route::create(RouteDefinition::new("/x", targets()), created).unwrap();
        let later = created.plus(std::time::Duration::from_secs(5));

        route
            .apply(
                RoutePolicyUpdate {
                    algorithm: Some(RoutingAlgorithm::RoundRobin),
                    weights: vec![(TargetKey::new("eu-west", "10.0.1.1:8080"), 7)],
                    ..Default::default()
                },
                later,
            )
            .unwrap();

        assert_eq!(route.algorithm, RoutingAlgorithm::RoundRobin);
        assert_eq!(route.targets[1].weight, 7);
        assert_eq!(route.updated_at, later);
        assert_eq!(route.created_at, created);
    }

    #[test]
    fn invalid_update_leaves_route_untouched() {
        let mut route = Route::create(RouteDefinition::new("/x", targets()), Timestamp::now()).unwrap();
        let before = route.clone();
        let result = route.apply(
            RoutePolicyUpdate {
                algorithm: Some(RoutingAlgorithm::CostBased),
                circuit_breaker: Some(CircuitBreakerPolicy::default().with_failure_threshold(0)),
                ..Default::default()
            },
            Timestamp::now(),
        );
        assert!(result.is_err());
        assert_eq!(route, before);
    }

    #[test]
    fn definition_deserializes_from_yaml() {
        let yaml = r#"
path: /orders/:id
method: PUT
algorithm: least_connections
targets:
  - region: us-east
    instance: orders-1:9000
    weight: 3
circuit_breaker:
  failure_threshold: 2
"#;
        let def: RouteDefinition = serde_yaml::from_str(yaml).unwrap();
        let route = Route::create(def, Timestamp::now()).unwrap();
        assert_eq!(route.method, Method::PUT);
        assert_eq!(route.algorithm, RoutingAlgorithm::LeastConnections);
        assert_eq!(route.targets[0].weight, 3);
        assert_eq!(route.circuit_breaker.failure_threshold, 2);
    }
}
