//! Application layer - Commands, Queries, Handlers and the Router.
//!
//! Handlers orchestrate domain operations across ports. The [`Router`]
//! composes them into the public routing API.

mod deps;
pub mod handlers;
mod health_board;
mod health_sweep;
mod router;

pub use deps::RouterDeps;
pub use handlers::{
    CreateRouteCommand, CreateRouteHandler, GetStatsHandler, GetStatsQuery, RecordOutcomeCommand,
    RecordOutcomeHandler, RemoveRouteCommand, RemoveRouteHandler, RouteDecision,
    RouteRequestCommand, RouteRequestHandler, UpdateRouteCommand, UpdateRouteHandler,
};
pub use health_board::{HealthBoard, HealthRecord};
pub use health_sweep::{HealthSweep, SweepSummary};
pub use router::Router;
