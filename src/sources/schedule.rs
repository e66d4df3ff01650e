//! Scheduled ticks, routed by schedule name.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::response::{Ack, BoxResponse};
use crate::routing::router::EventRouter;
use crate::routing::table::RouteTable;
use crate::routing::types::{EventSource, InputError, RouterError, RouterResult};
use crate::sources::{optional_str, required_str};

/// View over a `{"type": "schedule", "resource": ...}` event.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleInput<'e> {
    event: &'e Value,
    name: &'e str,
}

impl<'e> ScheduleInput<'e> {
    pub fn parse(event: &'e Value) -> Result<Self, InputError> {
        let name = required_str(event, &["resource"], "resource")?;
        Ok(Self { event, name })
    }

    /// The schedule name; the route key.
    pub fn name(&self) -> &'e str {
        self.name
    }

    /// Trigger time, when the scheduler supplies one.
    pub fn time(&self) -> Option<&'e str> {
        optional_str(self.event, &["time"])
    }

    pub fn event(&self) -> &'e Value {
        self.event
    }
}

pub type ScheduleHandler = Arc<dyn Fn(&ScheduleInput<'_>) -> Ack + Send + Sync>;

/// Routes scheduled ticks to handlers by schedule name.
#[derive(Clone)]
pub struct ScheduleRouter {
    routes: RouteTable<ScheduleHandler>,
}

impl ScheduleRouter {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(EventSource::Schedule),
        }
    }

    /// Register the handler for a schedule name.
    pub fn on<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ScheduleInput<'_>) -> Ack + Send + Sync + 'static,
    {
        self.routes.insert(name, Arc::new(handler));
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.routes.keys()
    }

    pub fn dispatch(&self, event: &Value) -> RouterResult<Ack> {
        let input =
            ScheduleInput::parse(event).map_err(RouterError::malformed(EventSource::Schedule))?;
        let handler = self.routes.resolve(input.name())?;
        tracing::debug!(schedule = %input.name(), "Dispatching schedule route");
        Ok(handler(&input))
    }
}

impl Default for ScheduleRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter for ScheduleRouter {
    fn route(&self, event: &Value) -> RouterResult<BoxResponse> {
        self.dispatch(event).map(|ack| Box::new(ack) as BoxResponse)
    }
}

impl fmt::Debug for ScheduleRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleRouter")
            .field("routes", &self.routes.keys())
            .finish()
    }
}
