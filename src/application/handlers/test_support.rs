//! Shared fixture for handler tests.

use std::sync::Arc;

use super::create_route::{CreateRouteCommand, CreateRouteHandler};
use crate::adapters::{MockClock, RecordingEventSink, StaticHealthChecker};
use crate::application::deps::RouterDeps;
use crate::config::RouterConfig;
use crate::domain::foundation::Timestamp;
use crate::domain::routing::{Route, RouteDefinition, Target};

const REGIONS: [&str; 3] = ["us-east", "eu-west", "ap-south"];

pub(crate) struct Fixture {
    pub deps: RouterDeps,
    pub clock: Arc<MockClock>,
    pub checker: StaticHealthChecker,
    pub events: RecordingEventSink,
}

impl Fixture {
    pub fn new() -> Self {
        let clock = Arc::new(MockClock::new(Timestamp::from_unix_millis(1_700_000_000_000)));
        let checker = StaticHealthChecker::new();
        let events = RecordingEventSink::new();
        let deps = RouterDeps::in_memory(
            &RouterConfig::default(),
            Arc::new(checker.clone()),
            clock.clone(),
        )
        .with_events(Arc::new(events.clone()));
        Self {
            deps,
            clock,
            checker,
            events,
        }
    }

    pub fn create(&self, definition: RouteDefinition) -> Arc<Route> {
        CreateRouteHandler::new(
            self.deps.registry.clone(),
            self.deps.breakers.clone(),
            self.deps.clock.clone(),
        )
        .handle(CreateRouteCommand { definition })
        .unwrap()
    }
}

/// `n` targets spread round the regions, one instance each.
pub(crate) fn targets(n: usize) -> Vec<Target> {
    (0..n)
        .map(|i| Target::new(REGIONS[i % REGIONS.len()], format!("10.0.0.{}:8080", i + 1)))
        .collect()
}
