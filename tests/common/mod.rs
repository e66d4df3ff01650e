//! Shared event fixtures and router setups for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::http::{Method, StatusCode};
use tracing_subscriber::fmt::MakeWriter;
use serde_json::{json, Value};

use lambda_router::http::{HttpInput, HttpResponse, HttpRoute, HttpRouter, HttpRoutes};
use lambda_router::response::Ack;
use lambda_router::sources::{PubSubRouter, ScheduleRouter, StorageRouter, StreamRouter};
use lambda_router::{AccessRequirement, Dispatcher};

pub const STREAM_ARN: &str =
    "arn:aws:dynamodb:eu-west-1:123456789012:table/items/stream/2024-01-01T00:00:00.000";
pub const TOPIC_ARN: &str = "arn:aws:sns:eu-west-1:123456789012:orders";

/// API gateway proxy event.
pub fn http_event(resource: &str, method: &str, params: Value) -> Value {
    json!({
        "resource": resource,
        "httpMethod": method,
        "pathParameters": params,
        "queryStringParameters": null,
        "headers": {"Content-Type": "application/json"},
        "body": null,
        "isBase64Encoded": false
    })
}

/// Attach authorizer claims to an HTTP event.
pub fn with_claims(mut event: Value, claims: Value) -> Value {
    event["requestContext"] = json!({"authorizer": {"claims": claims}});
    event
}

pub fn schedule_event(name: &str) -> Value {
    json!({"type": "schedule", "resource": name, "time": "2024-01-01T00:00:00Z"})
}

pub fn s3_event(key: &str) -> Value {
    json!({
        "Records": [{
            "eventSource": "aws:s3",
            "eventName": "ObjectCreated:Put",
            "s3": {"bucket": {"name": "media"}, "object": {"key": key, "size": 12}}
        }]
    })
}

pub fn sns_event(topic_arn: &str, message: &str) -> Value {
    json!({
        "Records": [{
            "EventSource": "aws:sns",
            "Sns": {"TopicArn": topic_arn, "Subject": "test", "Message": message}
        }]
    })
}

pub fn stream_event(stream_arn: &str, event_name: &str, new_image: Value) -> Value {
    json!({
        "Records": [{
            "eventSource": "aws:dynamodb",
            "eventSourceARN": stream_arn,
            "eventName": event_name,
            "dynamodb": {"Keys": {"id": {"S": "item-1"}}, "NewImage": new_image}
        }]
    })
}

fn item(input: &HttpInput<'_>) -> HttpResponse {
    HttpResponse::success(StatusCode::OK, &json!({"id": input.path_param("id")}))
}

/// Dispatcher with one route per source.
pub fn full_dispatcher() -> Dispatcher {
    let http = HttpRouter::new(
        HttpRoutes::new()
            .route("/items/{id}", Method::GET, HttpRoute::new(item))
            .route(
                "/admin/items/{id}",
                Method::DELETE,
                HttpRoute::new(item).require(AccessRequirement::roles(["Admin"])),
            ),
    );

    Dispatcher::builder()
        .http(http)
        .schedule(ScheduleRouter::new().on("nightly", |_| Ack::success("nightly done")))
        .stream(StreamRouter::new().on(STREAM_ARN, |_| Ack::success("stream done")))
        .storage(StorageRouter::new().on("/uploads", |_| Ack::success("storage done")))
        .pubsub(PubSubRouter::new().on(TOPIC_ARN, |_| Ack::success("pubsub done")))
        .log_events(false)
        .build()
}

/// In-memory log sink for asserting on emitted records.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Run `f` with a debug-level fmt subscriber writing into this sink.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines containing `needle`.
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
