//! Multi-source event router for serverless functions.
//!
//! One invocation entrypoint receives HTTP proxy requests, scheduled ticks,
//! change-feed records, object-storage notifications and pub/sub messages.
//! The [`Dispatcher`] classifies each event by shape and hands it to the
//! sub-router for its source, which resolves a handler from its route table.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod response;
pub mod routing;
pub mod security;
pub mod sources;

pub use config::schema::RouterConfig;
pub use http::{HttpInput, HttpResponse, HttpRoute, HttpRouter, HttpRoutes};
pub use response::{Ack, BoxResponse, Response};
pub use routing::{Dispatcher, EventRouter, EventSource, RouterError, RouterResult};
pub use security::{AccessRequirement, Claims, ClaimsProvider};
pub use sources::{PubSubRouter, ScheduleRouter, StorageRouter, StreamRouter};
