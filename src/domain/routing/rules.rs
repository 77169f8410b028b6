//! Caller-hint mappings used by the rule-driven algorithms.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::context::RequestContext;

/// Static mappings consulted by cost, user and content based selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingRules {
    /// Relative cost per region. Lower is cheaper.
    #[serde(default)]
    pub region_costs: HashMap<String, f64>,

    /// User id to preferred region.
    #[serde(default)]
    pub user_affinity: HashMap<String, String>,

    /// Evaluated in order; first match wins.
    #[serde(default)]
    pub content_rules: Vec<ContentRule>,
}

impl RoutingRules {
    pub fn with_region_cost(mut self, region: impl Into<String>, cost: f64) -> Self {
        self.region_costs.insert(region.into(), cost);
        self
    }

    pub fn with_user_affinity(mut self, user_id: impl Into<String>, region: impl Into<String>) -> Self {
        self.user_affinity.insert(user_id.into(), region.into());
        self
    }

    pub fn with_content_rule(mut self, rule: ContentRule) -> Self {
        self.content_rules.push(rule);
        self
    }

    /// Region of the first content rule matching the request.
    pub fn content_region(&self, ctx: &RequestContext) -> Option<&str> {
        self.content_rules
            .iter()
            .find(|rule| rule.matches(ctx))
            .map(|rule| rule.region.as_str())
    }
}

/// Maps a path prefix and/or header to a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRule {
    #[serde(default)]
    pub path_prefix: Option<String>,
    #[serde(default)]
    pub header: Option<HeaderMatch>,
    pub region: String,
}

impl ContentRule {
    pub fn for_prefix(prefix: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            path_prefix: Some(prefix.into()),
            header: None,
            region: region.into(),
        }
    }

    pub fn for_header(
        name: impl Into<String>,
        value: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            path_prefix: None,
            header: Some(HeaderMatch {
                name: name.into(),
                value: value.into(),
            }),
            region: region.into(),
        }
    }

    /// A rule with neither a prefix nor a header never matches.
    pub fn matches(&self, ctx: &RequestContext) -> bool {
        if self.path_prefix.is_none() && self.header.is_none() {
            return false;
        }
        let path_ok = match &self.path_prefix {
            Some(prefix) => ctx.path.as_deref().is_some_and(|p| p.starts_with(prefix.as_str())),
            None => true,
        };
        let header_ok = match &self.header {
            Some(h) => ctx.header(&h.name).is_some_and(|v| v == h.value),
            None => true,
        };
        path_ok && header_ok
    }
}

/// Exact header value match. Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_content_rule_wins() {
        let rules = RoutingRules::default()
            .with_content_rule(ContentRule::for_prefix("/media", "eu-west"))
            .with_content_rule(ContentRule::for_prefix("/media/video", "us-east"));
        let ctx = RequestContext::default().with_path("/media/video/1");
        assert_eq!(rules.content_region(&ctx), Some("eu-west"));
    }

    #[test]
    fn header_rule_matches_case_insensitive_name() {
        let rule = ContentRule::for_header("X-Tenant", "acme", "ap-south");
        let ctx = RequestContext::default().with_header("x-tenant", "acme");
        assert!(rule.matches(&ctx));
        let other = RequestContext::default().with_header("X-TENANT", "globex");
        assert!(!rule.matches(&other));
    }

    #[test]
    fn prefix_and_header_must_both_hold() {
        let rule = ContentRule {
            path_prefix: Some("/api".to_string()),
            header: Some(HeaderMatch {
                name: "x-tier".to_string(),
                value: "gold".to_string(),
            }),
            region: "us-west".to_string(),
        };
        let only_path = RequestContext::default().with_path("/api/x");
        assert!(!rule.matches(&only_path));
        let both = only_path.with_header("X-Tier", "gold");
        assert!(rule.matches(&both));
    }

    #[test]
    fn empty_rule_never_matches() {
        let rule = ContentRule {
            path_prefix: None,
            header: None,
            region: "us-east".to_string(),
        };
        assert!(!rule.matches(&RequestContext::default().with_path("/")));
    }
}
