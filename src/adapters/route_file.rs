//! Loads route definitions from a YAML file.
//!
//! ```yaml
//! routes:
//!   - path: /api/users/:id
//!     method: GET
//!     algorithm: least_connections
//!     targets:
//!       - { region: us-east, instance: "10.0.0.1:8080" }
//!       - { region: eu-west, instance: "10.0.1.1:8080", weight: 2 }
//!     circuit_breaker:
//!       failure_threshold: 3
//! ```
//!
//! Definitions are returned unvalidated; route creation validates them.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::routing::RouteDefinition;

/// Failure to read or parse a route file.
#[derive(Debug, Error)]
pub enum RouteFileError {
    #[error("failed to read route file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse route file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RouteFile {
    #[serde(default)]
    routes: Vec<RouteDefinition>,
}

/// Reads every route definition in the file, in file order.
pub fn load_routes_file(path: impl AsRef<Path>) -> Result<Vec<RouteDefinition>, RouteFileError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| RouteFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_routes(&raw).map_err(|source| RouteFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses route definitions from YAML text.
pub fn parse_routes(raw: &str) -> Result<Vec<RouteDefinition>, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: RouteFile = serde_yaml::from_str(raw)?;
    Ok(file.routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
routes:
  - path: /api/users/:id
    algorithm: least_connections
    targets:
      - { region: us-east, instance: "10.0.0.1:8080" }
      - { region: eu-west, instance: "10.0.1.1:8080", weight: 2 }
    circuit_breaker:
      failure_threshold: 3
  - path: /static/*
    method: head
    targets:
      - { region: us-east, instance: cdn.internal, scheme: https }
    rules:
      content_rules:
        - path_prefix: /static/eu
          region: eu-west
"#;

    #[test]
    fn parses_routes_in_file_order_with_defaults() {
        let routes = parse_routes(SAMPLE).unwrap();
        assert_eq!(routes.len(), 2);

        let users = &routes[0];
        assert_eq!(users.path, "/api/users/:id");
        assert_eq!(users.algorithm.as_deref(), Some("least_connections"));
        assert_eq!(users.targets[0].weight, 1);
        assert_eq!(users.targets[1].weight, 2);
        assert_eq!(users.circuit_breaker.failure_threshold, 3);
        assert_eq!(users.circuit_breaker.success_threshold, 2);
        assert!(users.health_check.enabled);

        let assets = &routes[1];
        assert_eq!(assets.method.as_deref(), Some("head"));
        assert_eq!(assets.targets[0].scheme, "https");
        assert_eq!(assets.rules.content_rules[0].region, "eu-west");
    }

    #[test]
    fn empty_file_has_no_routes() {
        assert!(parse_routes("").unwrap().is_empty());
        assert!(parse_routes("routes: []").unwrap().is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let routes = load_routes_file(file.path()).unwrap();
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("routes.yaml");
        let err = load_routes_file(&missing).unwrap_err();
        assert!(matches!(err, RouteFileError::Io { .. }));
        assert!(err.to_string().contains("routes.yaml"));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"routes:\n  - path: [unterminated").unwrap();
        let err = load_routes_file(file.path()).unwrap_err();
        assert!(matches!(err, RouteFileError::Parse { .. }));
    }
}
