//! Metrics domain - bounded outcome history and derived statistics.

mod live;
mod metric;
mod ring;
mod stats;

pub use live::{SampleWindow, TargetLoad, SAMPLE_WINDOW_CAPACITY};
pub use metric::RequestMetric;
pub use ring::RingBuffer;
pub use stats::{percentile, LoadBalancerStats, RegionSummary, RouteSummary};
