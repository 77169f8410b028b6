//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable point in time, always UTC, millisecond resolution for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Values outside chrono's representable range collapse to the epoch.
    pub fn from_unix_millis(millis: i64) -> Self {
        Self(
            Utc.timestamp_millis_opt(millis)
                .single()
                .unwrap_or_default(),
        )
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns a new timestamp moved forward by `duration`.
    ///
    /// Returns `self` unchanged if the result would leave chrono's range.
    pub fn plus(&self, duration: Duration) -> Self {
        to_chrono(duration)
            .and_then(|d| self.0.checked_add_signed(d))
            .map(Self)
            .unwrap_or(*self)
    }

    /// Returns a new timestamp moved backward by `duration`.
    ///
    /// Clamps to the earliest representable instant, so an unbounded window
    /// such as `Duration::MAX` reaches back over all history.
    pub fn minus(&self, duration: Duration) -> Self {
        to_chrono(duration)
            .and_then(|d| self.0.checked_sub_signed(d))
            .map(Self)
            .unwrap_or(Self(DateTime::<Utc>::MIN_UTC))
    }

    /// Time elapsed from `earlier` to `self`, or zero when `earlier` is later.
    pub fn elapsed_since(&self, earlier: &Timestamp) -> Duration {
        self.0
            .signed_duration_since(earlier.0)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

fn to_chrono(duration: Duration) -> Option<ChronoDuration> {
    ChronoDuration::from_std(duration).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn unix_millis_roundtrip() {
        let ts = Timestamp::from_unix_millis(1_705_276_800_123);
        assert_eq!(ts.as_unix_millis(), 1_705_276_800_123);
        assert_eq!(ts.as_datetime().year(), 2024);
    }

    #[test]
    fn plus_and_minus_move_by_duration() {
        let ts = Timestamp::from_unix_millis(10_000);
        assert_eq!(ts.plus(Duration::from_millis(250)).as_unix_millis(), 10_250);
        assert_eq!(ts.minus(Duration::from_secs(2)).as_unix_millis(), 8_000);
    }

    #[test]
    fn minus_clamps_to_earliest_instant() {
        let ts = Timestamp::from_unix_millis(10_000);
        let floor = ts.minus(Duration::MAX);
        assert_eq!(floor.as_datetime(), &DateTime::<Utc>::MIN_UTC);
        assert!(floor.is_before(&Timestamp::from_unix_millis(0)));
    }

    #[test]
    fn elapsed_since_is_zero_for_future_reference() {
        let early = Timestamp::from_unix_millis(1_000);
        let late = Timestamp::from_unix_millis(4_500);

        assert_eq!(late.elapsed_since(&early), Duration::from_millis(3_500));
        assert_eq!(early.elapsed_since(&late), Duration::ZERO);
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::from_unix_millis(1);
        let b = Timestamp::from_unix_millis(2);
        assert!(a < b);
        assert!(a.is_before(&b));
        assert!(b.is_after(&a));
    }

    #[test]
    fn timestamp_serializes_to_rfc3339() {
        let ts = Timestamp::from_unix_millis(1_705_314_600_000);
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15"));
    }
}
