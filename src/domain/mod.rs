//! Domain layer containing routing decisions and their supporting types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `routing` - Routes, targets, policies, request hints and errors
//! - `circuit_breaker` - Per-route failure gating state machine
//! - `metrics` - Bounded outcome history and derived statistics
//! - `selection` - Target selection algorithms and the selector

pub mod circuit_breaker;
pub mod foundation;
pub mod metrics;
pub mod routing;
pub mod selection;
