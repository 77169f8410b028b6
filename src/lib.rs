//! Waypoint - Routing decision layer
//!
//! Picks a backend target for each request: per-route circuit breakers,
//! pluggable selection algorithms, liveness probes and rolling latency
//! statistics. The caller performs the dispatch and reports the outcome.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
