//! Keyed route table shared by the machine-triggered sources.

use std::collections::HashMap;

use crate::routing::types::{EventSource, RouterError, RouterResult};

/// Single-key routing table for schedule, stream, storage and pub/sub routes.
///
/// Keys are matched exactly. A miss is an operator-facing
/// [`RouterError::HandlerMissing`], never a response.
#[derive(Debug, Clone)]
pub struct RouteTable<R> {
    event_source: EventSource,
    routes: HashMap<String, R>,
}

impl<R> RouteTable<R> {
    pub fn new(event_source: EventSource) -> Self {
        Self {
            event_source,
            routes: HashMap::new(),
        }
    }

    /// Builder form of [`RouteTable::insert`].
    pub fn with(mut self, key: impl Into<String>, route: R) -> Self {
        self.insert(key, route);
        self
    }

    /// Register a route. A repeated key replaces the earlier route.
    pub fn insert(&mut self, key: impl Into<String>, route: R) {
        let key = key.into();
        if self.routes.contains_key(&key) {
            tracing::warn!(
                source = %self.event_source,
                key = %key,
                "Route registered twice, keeping the last one"
            );
        }
        self.routes.insert(key, route);
    }

    /// Look up the route for `key`.
    pub fn resolve(&self, key: &str) -> RouterResult<&R> {
        self.routes.get(key).ok_or_else(|| RouterError::HandlerMissing {
            event_source: self.event_source,
            key: key.to_string(),
        })
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
