//! Error types shared by the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Stable, operator-facing error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    RouteNotFound,
    InvalidConfiguration,
    CircuitOpen,
    NoHealthyTarget,
    RateLimited,
}

impl ErrorCode {
    /// Returns the wire form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RouteNotFound => "ROUTE_NOT_FOUND",
            ErrorCode::InvalidConfiguration => "INVALID_CONFIGURATION",
            ErrorCode::CircuitOpen => "CIRCUIT_OPEN",
            ErrorCode::NoHealthyTarget => "NO_HEALTHY_TARGET",
            ErrorCode::RateLimited => "RATE_LIMITED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("targets");
        assert_eq!(format!("{}", err), "Field 'targets' cannot be empty");
        assert_eq!(err.field(), "targets");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("failure_threshold", 1.0, 1000.0, 0.0);
        assert_eq!(
            format!("{}", err),
            "Field 'failure_threshold' must be between 1 and 1000, got 0"
        );
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("path", "must start with '/'");
        assert_eq!(
            format!("{}", err),
            "Field 'path' has invalid format: must start with '/'"
        );
    }

    #[test]
    fn error_codes_are_screaming_snake_case() {
        assert_eq!(ErrorCode::CircuitOpen.to_string(), "CIRCUIT_OPEN");
        assert_eq!(ErrorCode::NoHealthyTarget.as_str(), "NO_HEALTHY_TARGET");
    }
}
