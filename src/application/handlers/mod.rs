//! Command and query handlers for the routing engine.

mod create_route;
mod get_stats;
mod record_outcome;
mod remove_route;
mod route_request;
mod update_route;

#[cfg(test)]
pub(crate) mod test_support;

pub use create_route::{CreateRouteCommand, CreateRouteHandler};
pub use get_stats::{GetStatsHandler, GetStatsQuery};
pub use record_outcome::{RecordOutcomeCommand, RecordOutcomeHandler};
pub use remove_route::{RemoveRouteCommand, RemoveRouteHandler};
pub use route_request::{RouteDecision, RouteRequestCommand, RouteRequestHandler};
pub use update_route::{UpdateRouteCommand, UpdateRouteHandler};
