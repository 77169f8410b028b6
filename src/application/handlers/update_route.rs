//! UpdateRouteHandler - changes a route's mutable policy fields.

use std::sync::Arc;

use crate::domain::foundation::RouteId;
use crate::domain::routing::{Route, RoutePolicyUpdate, RoutingError};
use crate::ports::{Clock, RouteRegistry};

/// Command to update a route's policies.
#[derive(Debug, Clone)]
pub struct UpdateRouteCommand {
    pub route_id: RouteId,
    pub update: RoutePolicyUpdate,
}

/// Handler for policy updates.
///
/// Breaker state survives an update; a new breaker policy applies from the
/// next evaluation.
pub struct UpdateRouteHandler {
    registry: Arc<dyn RouteRegistry>,
    clock: Arc<dyn Clock>,
}

impl UpdateRouteHandler {
    pub fn new(registry: Arc<dyn RouteRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    pub fn handle(&self, cmd: UpdateRouteCommand) -> Result<Arc<Route>, RoutingError> {
        let route = self
            .registry
            .update(&cmd.route_id, cmd.update, self.clock.now())?;
        tracing::info!(route_id = %route.id, algorithm = %route.algorithm, "Route updated");
        Ok(route)
    }
}
