//! Per-request hints supplied by the data plane.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where the caller is, either as a region code or coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserLocation {
    Region(String),
    Coordinates { latitude: f64, longitude: f64 },
}

/// Everything the selector may know about the incoming request.
///
/// All fields are optional; algorithms whose hint is missing fall back to
/// round-robin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub path: Option<String>,
    /// Header names are stored lowercased.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_location: Option<UserLocation>,
    #[serde(default)]
    pub preferred_region: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_region_location(mut self, region: impl Into<String>) -> Self {
        self.user_location = Some(UserLocation::Region(region.into()));
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.user_location = Some(UserLocation::Coordinates {
            latitude,
            longitude,
        });
        self
    }

    pub fn with_preferred_region(mut self, region: impl Into<String>) -> Self {
        self.preferred_region = Some(region.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_case_insensitive() {
        let ctx = RequestContext::new().with_header("Content-Type", "application/json");
        assert_eq!(ctx.header("content-type"), Some("application/json"));
        assert_eq!(ctx.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn location_deserializes_from_either_shape() {
        let region: UserLocation = serde_json::from_str("\"eu-west\"").unwrap();
        assert_eq!(region, UserLocation::Region("eu-west".to_string()));

        let coords: UserLocation =
            serde_json::from_str(r#"{"latitude":51.5,"longitude":-0.1}"#).unwrap();
        assert!(matches!(coords, UserLocation::Coordinates { .. }));
    }
}
