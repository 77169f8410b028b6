//! In-memory route registry.

use http::Method;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::{RouteId, Timestamp};
use crate::domain::routing::{Route, RoutePolicyUpdate, RoutingError};
use crate::ports::RouteRegistry;

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<RouteId, Arc<Route>>,
    /// Registration order.
    order: Vec<RouteId>,
}

/// Registry backed by a `RwLock`ed map.
///
/// Readers share the lock; writes happen only on create, update and remove.
#[derive(Debug, Default)]
pub struct InMemoryRouteRegistry {
    inner: RwLock<Inner>,
}

impl InMemoryRouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RouteRegistry for InMemoryRouteRegistry {
    fn insert(&self, route: Route) -> Result<Arc<Route>, RoutingError> {
        let mut inner = self.write();
        if inner.routes.contains_key(&route.id) {
            return Err(RoutingError::invalid_configuration(
                "id",
                format!("route {} is already registered", route.id),
            ));
        }
        let id = route.id;
        let route = Arc::new(route);
        inner.routes.insert(id, Arc::clone(&route));
        inner.order.push(id);
        Ok(route)
    }

    fn get(&self, id: &RouteId) -> Option<Arc<Route>> {
        self.read().routes.get(id).cloned()
    }

    fn list(&self) -> Vec<Arc<Route>> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.routes.get(id).cloned())
            .collect()
    }

    fn resolve(&self, method: &Method, path: &str) -> Option<Arc<Route>> {
        let inner = self.read();
        let mut best: Option<&Arc<Route>> = None;
        for route in inner.order.iter().filter_map(|id| inner.routes.get(id)) {
            if !route.serves(method, path) {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => route.path.specificity() > current.path.specificity(),
            };
            if better {
                best = Some(route);
            }
        }
        best.cloned()
    }

    fn update(
        &self,
        id: &RouteId,
        update: RoutePolicyUpdate,
        now: Timestamp,
    ) -> Result<Arc<Route>, RoutingError> {
        let mut inner = self.write();
        let current = inner
            .routes
            .get(id)
            .ok_or_else(|| RoutingError::not_found(*id))?;
        let mut next = Route::clone(current);
        next.apply(update, now)?;
        let next = Arc::new(next);
        inner.routes.insert(*id, Arc::clone(&next));
        Ok(next)
    }

    fn remove(&self, id: &RouteId) -> Option<Arc<Route>> {
        let mut inner = self.write();
        let removed = inner.routes.remove(id)?;
        inner.order.retain(|existing| existing != id);
        Some(removed)
    }
}
