//! Top-level event dispatch.
//!
//! # Responsibilities
//! - Hold one `(source, classifier, router)` entry per registered source
//! - Hand each event to the first entry whose classifier accepts it
//! - Turn panics anywhere below into a recorded `UnexpectedFault`
//!
//! # Design Decisions
//! - Immutable after `build()`; concurrent `handle` calls need no locking
//! - Priority is explicit: registration order, optionally reordered by a
//!   configured priority list that also drops sources it does not name
//! - First match wins; later entries are never consulted
//! - Router errors pass through unchanged, only panics are converted

use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use crate::http::router::HttpRouter;
use crate::observability::{metrics, panic_site};
use crate::response::BoxResponse;
use crate::routing::matcher::{Classifier, HttpClassifier, RecordSourceClassifier, ScheduleClassifier};
use crate::routing::types::{EventSource, RouterError, RouterResult};
use crate::sources::{PubSubRouter, ScheduleRouter, StorageRouter, StreamRouter};

/// A sub-router for one source family.
pub trait EventRouter: Send + Sync {
    /// Route an event already accepted by this source's classifier.
    fn route(&self, event: &Value) -> RouterResult<BoxResponse>;
}

struct Entry {
    source: EventSource,
    classifier: Arc<dyn Classifier>,
    router: Arc<dyn EventRouter>,
}

/// Classifies events and delegates them to the matching sub-router.
pub struct Dispatcher {
    entries: Vec<Entry>,
    log_events: bool,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Sources in the order their classifiers are tried.
    pub fn sources(&self) -> Vec<EventSource> {
        self.entries.iter().map(|entry| entry.source).collect()
    }

    /// Dispatch one event and return the serialized response payload.
    pub fn handle(&self, event: &Value) -> RouterResult<Value> {
        let span = crate::observability::tracing::invocation_span();
        let _enter = span.enter();

        if self.log_events {
            tracing::info!(event = %event, "Incoming event");
        }

        panic_site::take();
        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(event))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                // Falls back to the boundary's own stack if another hook
                // replaced ours.
                let (location, backtrace) = match panic_site::take() {
                    Some(site) => (site.location, site.backtrace),
                    None => (None, Backtrace::force_capture()),
                };
                tracing::error!(
                    error = %message,
                    location = location.as_deref().unwrap_or("unknown"),
                    backtrace = %backtrace,
                    "Unexpected panic while dispatching event"
                );
                metrics::record_fault();
                Err(RouterError::UnexpectedFault(message))
            }
        }
    }

    fn dispatch(&self, event: &Value) -> RouterResult<Value> {
        let Some(entry) = self.entries.iter().find(|entry| entry.classifier.matches(event)) else {
            tracing::warn!("No classifier matched event");
            metrics::record_unmatched();
            return Err(RouterError::UnknownEvent);
        };

        tracing::Span::current().record("source", entry.source.as_str());
        tracing::debug!(source = %entry.source, "Event classified");

        match entry.router.route(event) {
            Ok(response) => {
                let outcome = if response.is_success() {
                    metrics::OUTCOME_SUCCESS
                } else {
                    metrics::OUTCOME_FAILURE
                };
                metrics::record_invocation(entry.source, outcome);
                Ok(response.payload())
            }
            Err(e) => {
                tracing::warn!(source = %entry.source, error = %e, "Routing failed");
                metrics::record_invocation(entry.source, metrics::OUTCOME_ERROR);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sources", &self.sources())
            .field("log_events", &self.log_events)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    entries: Vec<Entry>,
    priority: Option<Vec<EventSource>>,
    log_events: bool,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            priority: None,
            log_events: true,
        }
    }
}

impl DispatcherBuilder {
    pub fn http(self, router: HttpRouter) -> Self {
        self.entry(EventSource::Http, HttpClassifier, router)
    }

    pub fn schedule(self, router: ScheduleRouter) -> Self {
        self.entry(EventSource::Schedule, ScheduleClassifier, router)
    }

    pub fn stream(self, router: StreamRouter) -> Self {
        self.entry(EventSource::Stream, RecordSourceClassifier::stream(), router)
    }

    pub fn storage(self, router: StorageRouter) -> Self {
        self.entry(EventSource::Storage, RecordSourceClassifier::storage(), router)
    }

    pub fn pubsub(self, router: PubSubRouter) -> Self {
        self.entry(EventSource::PubSub, RecordSourceClassifier::pubsub(), router)
    }

    /// Register an arbitrary classifier and router. Entries are tried in
    /// registration order unless a priority list is set.
    pub fn entry(
        mut self,
        source: EventSource,
        classifier: impl Classifier + 'static,
        router: impl EventRouter + 'static,
    ) -> Self {
        self.entries.push(Entry {
            source,
            classifier: Arc::new(classifier),
            router: Arc::new(router),
        });
        self
    }

    /// Reorder entries by source. Entries whose source is not listed are
    /// dropped; entries sharing a source keep their registration order.
    pub fn priority(mut self, order: &[EventSource]) -> Self {
        self.priority = Some(order.to_vec());
        self
    }

    /// Log every incoming event before dispatch.
    pub fn log_events(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    pub fn build(self) -> Dispatcher {
        panic_site::install_hook();

        let entries = match self.priority {
            None => self.entries,
            Some(order) => {
                let mut ranked: Vec<(usize, Entry)> = Vec::with_capacity(self.entries.len());
                for entry in self.entries {
                    match order.iter().position(|s| *s == entry.source) {
                        Some(rank) => ranked.push((rank, entry)),
                        None => tracing::warn!(
                            source = %entry.source,
                            "Source not in dispatch priority, dropping it"
                        ),
                    }
                }
                ranked.sort_by_key(|(rank, _)| *rank);
                ranked.into_iter().map(|(_, entry)| entry).collect()
            }
        };

        tracing::info!(
            sources = ?entries.iter().map(|e| e.source.as_str()).collect::<Vec<_>>(),
            "Dispatcher built"
        );

        Dispatcher {
            entries,
            log_events: self.log_events,
        }
    }
}
