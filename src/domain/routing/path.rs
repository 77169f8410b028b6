//! Route path patterns.
//!
//! A pattern is a `/`-separated list of segments. A segment is either a
//! literal, a `:name` parameter matching exactly one segment, or a trailing
//! `*` matching any remainder (including nothing).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Wildcard,
}

/// Parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::empty_field("path"));
        }
        if !raw.starts_with('/') {
            return Err(ValidationError::invalid_format("path", "must start with '/'"));
        }

        let parts: Vec<&str> = split(&raw).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if i + 1 != parts.len() {
                    return Err(ValidationError::invalid_format(
                        "path",
                        "'*' is only allowed as the last segment",
                    ));
                }
                Segment::Wildcard
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(ValidationError::invalid_format(
                        "path",
                        "parameter segment needs a name",
                    ));
                }
                Segment::Param
            } else {
                Segment::Literal((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self { raw, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True if the concrete request path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split(path).collect();
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                Segment::Wildcard => return true,
                Segment::Param => {
                    if i >= parts.len() {
                        return false;
                    }
                }
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                }
            }
            i += 1;
        }
        i == parts.len()
    }

    /// Ordering key: more literal segments first, wildcard last.
    ///
    /// Higher compares as more specific.
    pub fn specificity(&self) -> (usize, bool, usize) {
        let literals = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count();
        let no_wildcard = !self.segments.contains(&Segment::Wildcard);
        (literals, no_wildcard, self.segments.len())
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PathPattern {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PathPattern::parse(value)
    }
}

impl From<PathPattern> for String {
    fn from(pattern: PathPattern) -> Self {
        pattern.raw
    }
}
