//! Routing event sinks.

mod recording;
mod tracing_sink;

pub use recording::RecordingEventSink;
pub use tracing_sink::TracingEventSink;
