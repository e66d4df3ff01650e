//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated route manifest into a frozen [`Dispatcher`]
//! - Bind every configured route to an echo handler for local invocation
//!
//! # Design Decisions
//! - Fail fast: configuration is validated before anything is built
//! - The echo handlers report what was matched, so a manifest can be
//!   exercised against recorded events without deploying real handlers

use axum::http::{Method, StatusCode};
use serde_json::{json, Map, Value};

use crate::config::schema::{HttpRouteConfig, RouterConfig};
use crate::http::request::HttpInput;
use crate::http::response::HttpResponse;
use crate::http::router::{HttpRoute, HttpRouter, HttpRoutes};
use crate::response::Ack;
use crate::routing::router::Dispatcher;
use crate::routing::types::EventSource;
use crate::security::access_control::AccessRequirement;
use crate::sources::{
    PubSubInput, PubSubRouter, ScheduleInput, ScheduleRouter, StorageInput, StorageRouter,
    StreamInput, StreamRouter,
};

/// Build a dispatcher whose routes come from `config`, all bound to echo
/// handlers.
pub fn build_dispatcher(config: &RouterConfig) -> Dispatcher {
    let routes = &config.routes;

    let mut http = HttpRoutes::new();
    for route in &routes.http {
        match echo_http_route(route) {
            Some((method, entry)) => http.insert(route.template.clone(), method, entry),
            None => tracing::warn!(
                method = %route.method,
                template = %route.template,
                "Skipping HTTP route with invalid method"
            ),
        }
    }

    let schedule = routes
        .schedule
        .iter()
        .fold(ScheduleRouter::new(), |router, key| {
            let key = key.clone();
            router.on(key.clone(), move |_: &ScheduleInput<'_>| {
                echo_ack(EventSource::Schedule, &key)
            })
        });
    let stream = routes.stream.iter().fold(StreamRouter::new(), |router, key| {
        let key = key.clone();
        router.on(key.clone(), move |_: &StreamInput<'_>| {
            echo_ack(EventSource::Stream, &key)
        })
    });
    let storage = routes.storage.iter().fold(StorageRouter::new(), |router, key| {
        let key = key.clone();
        router.on(key.clone(), move |_: &StorageInput<'_>| {
            echo_ack(EventSource::Storage, &key)
        })
    });
    let pubsub = routes.pubsub.iter().fold(PubSubRouter::new(), |router, key| {
        let key = key.clone();
        router.on(key.clone(), move |_: &PubSubInput<'_>| {
            echo_ack(EventSource::PubSub, &key)
        })
    });

    tracing::info!(
        http = http.len(),
        schedule = routes.schedule.len(),
        stream = routes.stream.len(),
        storage = routes.storage.len(),
        pubsub = routes.pubsub.len(),
        "Routes registered"
    );

    Dispatcher::builder()
        .http(HttpRouter::new(http))
        .schedule(schedule)
        .stream(stream)
        .storage(storage)
        .pubsub(pubsub)
        .priority(&config.dispatch.priority)
        .log_events(config.dispatch.log_events)
        .build()
}

/// Every configured route as `(source, description)`, in dispatch order.
pub fn describe_routes(config: &RouterConfig) -> Vec<(EventSource, String)> {
    let mut lines = Vec::new();
    for source in &config.dispatch.priority {
        match source {
            EventSource::Http => {
                for route in &config.routes.http {
                    let access = match &route.access {
                        Some(access) => format!(
                            " [{} in {}]",
                            access.claim_key,
                            access.roles.join("|")
                        ),
                        None => String::new(),
                    };
                    lines.push((
                        *source,
                        format!("{} {}{}", route.method, route.template, access),
                    ));
                }
            }
            other => {
                for key in config.routes.keys(*other) {
                    lines.push((*other, key.clone()));
                }
            }
        }
    }
    lines
}

fn echo_http_route(route: &HttpRouteConfig) -> Option<(Method, HttpRoute)> {
    let method = Method::from_bytes(route.method.as_bytes()).ok()?;
    let template = route.template.clone();
    let mut entry = HttpRoute::new(move |input: &HttpInput<'_>| {
        HttpResponse::success(
            StatusCode::OK,
            &json!({
                "template": template,
                "method": input.method(),
                "pathParameters": collect(input.path_params()),
                "queryStringParameters": collect(input.query_params()),
            }),
        )
    });
    if let Some(access) = &route.access {
        entry = entry.require(AccessRequirement::new(
            access.claim_key.clone(),
            access.roles.iter().cloned(),
        ));
    }
    Some((method, entry))
}

fn collect<'e>(pairs: impl Iterator<Item = (&'e str, &'e str)>) -> Map<String, Value> {
    pairs
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

fn echo_ack(source: EventSource, key: &str) -> Ack {
    Ack::success(format!("{source} route `{key}` handled"))
}
