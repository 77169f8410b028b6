//! Route registry port - owns the configured routes.

use http::Method;
use std::sync::Arc;

use crate::domain::foundation::{RouteId, Timestamp};
use crate::domain::routing::{Route, RoutePolicyUpdate, RoutingError};

/// Storage and lookup of routes.
///
/// Lookups are read-mostly and must not block each other. Routes are handed
/// out as `Arc<Route>` snapshots; an update replaces the snapshot rather than
/// mutating a shared one.
pub trait RouteRegistry: Send + Sync {
    /// Adds a validated route.
    fn insert(&self, route: Route) -> Result<Arc<Route>, RoutingError>;

    fn get(&self, id: &RouteId) -> Option<Arc<Route>>;

    /// All routes in registration order.
    fn list(&self) -> Vec<Arc<Route>>;

    /// Most specific route serving `method` and `path`.
    ///
    /// Literal segments beat parameters, parameters beat a trailing
    /// wildcard; among equals the first registered wins.
    fn resolve(&self, method: &Method, path: &str) -> Option<Arc<Route>>;

    /// Applies a policy update and returns the new snapshot.
    fn update(
        &self,
        id: &RouteId,
        update: RoutePolicyUpdate,
        now: Timestamp,
    ) -> Result<Arc<Route>, RoutingError>;

    /// Removes a route. Returns the removed route, or `None` if absent.
    fn remove(&self, id: &RouteId) -> Option<Arc<Route>>;
}
