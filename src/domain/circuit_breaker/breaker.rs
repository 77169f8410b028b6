//! Per-route circuit breaker record and its transition rules.
//!
//! The record is a plain value; callers hold it behind a per-route lock and
//! pass the current time in, so timeouts are evaluated lazily and tests can
//! drive virtual time.

use serde::Serialize;
use std::time::Duration;

use super::state::CircuitState;
use crate::domain::foundation::{StateMachine, Timestamp};
use crate::domain::routing::CircuitBreakerPolicy;

/// A state change produced by an admission check or an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitTransition {
    pub from: CircuitState,
    pub to: CircuitState,
    /// Failure streak at the moment of the change.
    pub consecutive_failures: u32,
    pub at: Timestamp,
}

/// Result of asking the breaker whether a dispatch may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed {
        /// Set when the check itself moved Open to HalfOpen.
        transition: Option<CircuitTransition>,
    },
    Rejected {
        retry_after: Duration,
        consecutive_failures: u32,
    },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }
}

/// Mutable breaker record for one route.
///
/// Invariant: `state == Open` implies `last_failure_at.is_some()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CircuitBreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    last_failure_at: Option<Timestamp>,
    total_successes: u64,
    total_failures: u64,
    times_opened: u64,
    rejected: u64,
}

impl CircuitBreakerState {
    /// A closed breaker with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    pub fn last_failure_at(&self) -> Option<Timestamp> {
        self.last_failure_at
    }

    /// Gate a dispatch attempt.
    ///
    /// An open circuit whose timeout has elapsed moves to half-open and
    /// admits the request. Otherwise an open circuit rejects and counts the
    /// rejection.
    pub fn admit(&mut self, policy: &CircuitBreakerPolicy, now: Timestamp) -> Admission {
        if self.state != CircuitState::Open {
            return Admission::Allowed { transition: None };
        }

        match self.remaining_open(policy, now) {
            Some(retry_after) if !retry_after.is_zero() => {
                self.rejected += 1;
                Admission::Rejected {
                    retry_after,
                    consecutive_failures: self.consecutive_failures,
                }
            }
            _ => {
                let transition = self.move_to(CircuitState::HalfOpen, now);
                self.consecutive_successes = 0;
                Admission::Allowed { transition }
            }
        }
    }

    /// Apply a successful outcome.
    pub fn on_success(&mut self, policy: &CircuitBreakerPolicy, now: Timestamp) -> Option<CircuitTransition> {
        self.total_successes += 1;
        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures = 0;
                None
            }
            CircuitState::HalfOpen => {
                self.consecutive_successes += 1;
                if self.consecutive_successes >= policy.success_threshold {
                    let transition = self.move_to(CircuitState::Closed, now);
                    self.consecutive_failures = 0;
                    self.consecutive_successes = 0;
                    transition
                } else {
                    None
                }
            }
            // Late report for a request admitted before the circuit opened.
            CircuitState::Open => None,
        }
    }

    /// Apply a failed outcome.
    pub fn on_failure(&mut self, policy: &CircuitBreakerPolicy, now: Timestamp) -> Option<CircuitTransition> {
        self.total_failures += 1;
        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= policy.failure_threshold {
                    self.open(now)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => {
                self.consecutive_failures += 1;
                self.open(now)
            }
            // Does not extend the open window.
            CircuitState::Open => None,
        }
    }

    /// Force the breaker closed, clearing streaks but keeping totals.
    pub fn reset(&mut self) {
        self.state = CircuitState::Closed;
        self.consecutive_failures = 0;
        self.consecutive_successes = 0;
        self.last_failure_at = None;
    }

    /// Time left before an open circuit admits a trial request.
    ///
    /// `None` unless the circuit is open.
    pub fn remaining_open(&self, policy: &CircuitBreakerPolicy, now: Timestamp) -> Option<Duration> {
        if self.state != CircuitState::Open {
            return None;
        }
        let Some(opened) = self.last_failure_at else {
            return Some(Duration::ZERO);
        };
        let elapsed = now.elapsed_since(&opened);
        Some(policy.open_timeout().saturating_sub(elapsed))
    }

    /// Point-in-time view for operators.
    pub fn snapshot(&self, policy: &CircuitBreakerPolicy, now: Timestamp) -> CircuitBreakerSnapshot {
        CircuitBreakerSnapshot {
            state: self.state,
            consecutive_failures: self.consecutive_failures,
            consecutive_successes: self.consecutive_successes,
            last_failure_at: self.last_failure_at,
            time_until_half_open_ms: self
                .remaining_open(policy, now)
                .map(|d| d.as_millis() as u64),
            total_successes: self.total_successes,
            total_failures: self.total_failures,
            times_opened: self.times_opened,
            rejected: self.rejected,
        }
    }

    fn open(&mut self, now: Timestamp) -> Option<CircuitTransition> {
        let transition = self.move_to(CircuitState::Open, now);
        if transition.is_some() {
            self.last_failure_at = Some(now);
            self.consecutive_successes = 0;
            self.times_opened += 1;
        }
        transition
    }

    fn move_to(&mut self, next: CircuitState, now: Timestamp) -> Option<CircuitTransition> {
        let from = self.state;
        let to = from.transition_to(next).ok()?;
        self.state = to;
        Some(CircuitTransition {
            from,
            to,
            consecutive_failures: self.consecutive_failures,
            at: now,
        })
    }
}

/// Breaker counters and timing, as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitBreakerSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub last_failure_at: Option<Timestamp>,
    /// Only set while open.
    pub time_until_half_open_ms: Option<u64>,
    pub total_successes: u64,
    pub total_failures: u64,
    pub times_opened: u64,
    pub rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CircuitBreakerPolicy {
        CircuitBreakerPolicy::default()
    }

    fn fail_n(breaker: &mut CircuitBreakerState, n: u32, now: Timestamp) {
        for _ in 0..n {
            breaker.on_failure(&policy(), now);
        }
    }

    // ─── Closed ───

    #[test]
    fn opens_on_exactly_the_threshold_failure() {
        let now = Timestamp::now();
        let mut breaker = CircuitBreakerState::new();

        fail_n(&mut breaker, 4, now);
        assert_eq!(breaker.state(), CircuitState::Closed);

        let transition = breaker.on_failure(&policy(), now).unwrap();
        assert_eq!(transition.from, CircuitState::Closed);
        assert_eq!(transition.to, CircuitState::Open);
        assert_eq!(transition.consecutive_failures, 5);
        assert_eq!(breaker.last_failure_at(), Some(now));
    }

    #[test]
    fn success_resets_the_failure_streak() {
        let now = Timestamp::now();
        let mut breaker = CircuitBreakerState::new();

        fail_n(&mut breaker, 4, now);
        breaker.on_success(&policy(), now);
        assert_eq!(breaker.consecutive_failures(), 0);

        fail_n(&mut breaker, 4, now);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    // ─── Open ───

    #[test]
    fn open_rejects_until_timeout() {
        let start = Timestamp::now();
        let mut breaker = CircuitBreakerState::new();
        fail_n(&mut breaker, 5, start);

        let admission = breaker.admit(&policy(), start.plus(Duration::from_secs(59)));
        assert_eq!(
            admission,
            Admission::Rejected {
                retry_after: Duration::from_secs(1),
                consecutive_failures: 5,
            }
        );
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn elapsed_timeout_moves_to_half_open_on_admission() {
        let start = Timestamp::now();
        let mut breaker = CircuitBreakerState::new();
        fail_n(&mut breaker, 5, start);

        let admission = breaker.admit(&policy(), start.plus(Duration::from_secs(60)));
        match admission {
            Admission::Allowed {
                transition: Some(t),
            } => assert_eq!(t.to, CircuitState::HalfOpen),
            other => panic!("expected half-open transition, got {:?}", other),
        }
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn late_failure_while_open_does_not_extend_window() {
        let start = Timestamp::now();
        let mut breaker = CircuitBreakerState::new();
        fail_n(&mut breaker, 5, start);
        breaker.on_failure(&policy(), start.plus(Duration::from_secs(30)));
        assert_eq!(breaker.last_failure_at(), Some(start));
    }

    // ─── Half-open ───

    #[test]
    fn half_open_closes_after_success_threshold() {
        let start = Timestamp::now();
        let later = start.plus(Duration::from_secs(61));
        let mut breaker = CircuitBreakerState::new();
        fail_n(&mut breaker, 5, start);
        breaker.admit(&policy(), later);

        assert!(breaker.on_success(&policy(), later).is_none());
        let transition = breaker.on_success(&policy(), later).unwrap();
        assert_eq!(transition.to, CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(), 0);
    }

    #[test]
    fn half_open_failure_reopens_immediately() {
        let start = Timestamp::now();
        let later = start.plus(Duration::from_secs(61));
        let mut breaker = CircuitBreakerState::new();
        fail_n(&mut breaker, 5, start);
        breaker.admit(&policy(), later);
        breaker.on_success(&policy(), later);

        let transition = breaker.on_failure(&policy(), later).unwrap();
        assert_eq!(transition.to, CircuitState::Open);
        assert_eq!(breaker.last_failure_at(), Some(later));
        assert_eq!(breaker.consecutive_successes(), 0);
    }

    // ─── Reset and snapshot ───

    #[test]
    fn reset_closes_and_keeps_totals() {
        let now = Timestamp::now();
        let mut breaker = CircuitBreakerState::new();
        fail_n(&mut breaker, 5, now);
        breaker.admit(&policy(), now);
        breaker.reset();

        let snapshot = breaker.snapshot(&policy(), now);
        assert_eq!(snapshot.state, CircuitState::Closed);
        assert_eq!(snapshot.total_failures, 5);
        assert_eq!(snapshot.times_opened, 1);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.time_until_half_open_ms, None);
    }

    #[test]
    fn snapshot_reports_time_until_half_open() {
        let now = Timestamp::now();
        let mut breaker = CircuitBreakerState::new();
        fail_n(&mut breaker, 5, now);
        let snapshot = breaker.snapshot(&policy(), now.plus(Duration::from_secs(15)));
        assert_eq!(snapshot.time_until_half_open_ms, Some(45_000));
    }
}
