//! Recent per-target signals kept beside the main ring.
//!
//! Selection reads these instead of scanning the full history, so a lookup
//! costs at most one small window per candidate.

use serde::Serialize;
use std::time::Duration;

use super::ring::RingBuffer;
use crate::domain::foundation::Timestamp;

/// Samples retained per target.
pub const SAMPLE_WINDOW_CAPACITY: usize = 64;

/// Recent behaviour of one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetLoad {
    /// `None` when no sample falls inside the window.
    pub avg_latency_ms: Option<f64>,
    pub error_rate: f64,
    pub samples: usize,
}

impl TargetLoad {
    pub fn empty() -> Self {
        Self {
            avg_latency_ms: None,
            error_rate: 0.0,
            samples: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Timestamp,
    response_time_ms: f64,
    is_error: bool,
}

/// Bounded window of the latest outcomes for a target.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: RingBuffer<Sample>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            samples: RingBuffer::with_capacity(SAMPLE_WINDOW_CAPACITY),
        }
    }

    pub fn record(&mut self, at: Timestamp, response_time_ms: f64, is_error: bool) {
        self.samples.push(Sample {
            at,
            response_time_ms,
            is_error,
        });
    }

    /// Summarises samples no older than `window`.
    pub fn load(&self, now: Timestamp, window: Duration) -> TargetLoad {
        let since = now.minus(window);
        let mut count = 0usize;
        let mut errors = 0usize;
        let mut total_ms = 0.0;
        for sample in self.samples.iter().filter(|s| !s.at.is_before(&since)) {
            count += 1;
            total_ms += sample.response_time_ms;
            if sample.is_error {
                errors += 1;
            }
        }
        if count == 0 {
            return TargetLoad::empty();
        }
        TargetLoad {
            avg_latency_ms: Some(total_ms / count as f64),
            error_rate: errors as f64 / count as f64,
            samples: count,
        }
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_has_no_latency() {
        let window = SampleWindow::new();
        assert_eq!(window.load(Timestamp::now(), Duration::from_secs(60)), TargetLoad::empty());
    }

    #[test]
    fn load_averages_recent_samples_only() {
        let now = Timestamp::now();
        let mut window = SampleWindow::new();
        window.record(now.minus(Duration::from_secs(600)), 5_000.0, true);
        window.record(now.minus(Duration::from_secs(10)), 100.0, false);
        window.record(now, 300.0, true);

        let load = window.load(now, Duration::from_secs(300));
        assert_eq!(load.samples, 2);
        assert_eq!(load.avg_latency_ms, Some(200.0));
        assert_eq!(load.error_rate, 0.5);
    }

    #[test]
    fn window_is_bounded() {
        let now = Timestamp::now();
        let mut window = SampleWindow::new();
        for _ in 0..(SAMPLE_WINDOW_CAPACITY * 3) {
            window.record(now, 10.0, false);
        }
        assert_eq!(window.load(now, Duration::from_secs(1)).samples, SAMPLE_WINDOW_CAPACITY);
    }
}
