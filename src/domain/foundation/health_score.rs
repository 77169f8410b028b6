//! Health score value object (0.0 - 1.0 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of successful outcomes, clamped to `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthScore(f64);

impl HealthScore {
    /// No successful outcomes.
    pub const ZERO: Self = Self(0.0);

    /// Every outcome succeeded (or nothing has been observed yet).
    pub const PERFECT: Self = Self(1.0);

    /// Creates a score, clamping into range. NaN becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Score for `errors` failures out of `total` observations.
    ///
    /// An empty sample counts as perfectly healthy.
    pub fn from_outcomes(total: u64, errors: u64) -> Self {
        if total == 0 {
            return Self::PERFECT;
        }
        let successes = total.saturating_sub(errors);
        Self::new(successes as f64 / total as f64)
    }

    /// Returns the raw fraction.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for HealthScore {
    fn default() -> Self {
        Self::PERFECT
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_to_unit_interval() {
        assert_eq!(HealthScore::new(1.7).value(), 1.0);
        assert_eq!(HealthScore::new(-0.2).value(), 0.0);
        assert_eq!(HealthScore::new(f64::NAN).value(), 0.0);
    }

    #[test]
    fn from_outcomes_is_success_ratio() {
        assert_eq!(HealthScore::from_outcomes(4, 1).value(), 0.75);
        assert_eq!(HealthScore::from_outcomes(0, 0), HealthScore::PERFECT);
        assert_eq!(HealthScore::from_outcomes(2, 5), HealthScore::ZERO);
    }

    #[test]
    fn displays_as_percentage() {
        assert_eq!(HealthScore::new(0.875).to_string(), "87.5%");
    }
}
