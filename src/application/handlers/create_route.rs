//! CreateRouteHandler - validates and registers a route.

use std::sync::Arc;

use crate::domain::routing::{Route, RouteDefinition, RoutingError};
use crate::ports::{CircuitBreakerManager, Clock, RouteRegistry};

/// Command to register a new route.
#[derive(Debug, Clone)]
pub struct CreateRouteCommand {
    pub definition: RouteDefinition,
}

/// Handler for creating routes.
pub struct CreateRouteHandler {
    registry: Arc<dyn RouteRegistry>,
    breakers: Arc<dyn CircuitBreakerManager>,
    clock: Arc<dyn Clock>,
}

impl CreateRouteHandler {
    pub fn new(
        registry: Arc<dyn RouteRegistry>,
        breakers: Arc<dyn CircuitBreakerManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            breakers,
            clock,
        }
    }

    pub fn handle(&self, cmd: CreateRouteCommand) -> Result<Arc<Route>, RoutingError> {
        // 1. Validate the definition into a route; nothing is stored on failure
        let route = Route::create(cmd.definition, self.clock.now())?;

        // 2. Register and give it a closed breaker
        let route = self.registry.insert(route)?;
        self.breakers.register(route.id);

        tracing::info!(
            route_id = %route.id,
            method = %route.method,
            path = route.path.as_str(),
            targets = route.targets.len(),
            algorithm = %route.algorithm,
            "Route created"
        );
        Ok(route)
    }
}
