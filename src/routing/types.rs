//! Shared routing types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event source families the dispatcher knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// API gateway proxy request.
    Http,
    /// Scheduled tick carrying a schedule name.
    Schedule,
    /// Change-data-capture record (DynamoDB stream).
    Stream,
    /// Object-storage notification (S3).
    Storage,
    /// Pub/sub message (SNS).
    PubSub,
}

impl EventSource {
    /// Default dispatch priority: HTTP first, then the machine-triggered sources.
    pub const DEFAULT_PRIORITY: [EventSource; 5] = [
        EventSource::Http,
        EventSource::Schedule,
        EventSource::Stream,
        EventSource::Storage,
        EventSource::PubSub,
    ];

    /// Stable lowercase name used in logs, metrics and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Http => "http",
            EventSource::Schedule => "schedule",
            EventSource::Stream => "stream",
            EventSource::Storage => "storage",
            EventSource::PubSub => "pubsub",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading fields out of an event.
#[derive(Debug, Error)]
pub enum InputError {
    /// A required field is absent or null.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// The event carries no `Records` entry.
    #[error("event has no records")]
    NoRecords,

    /// The request has no body.
    #[error("missing request body")]
    MissingBody,

    /// The body (or message) could not be decoded as JSON.
    #[error("could not parse {what} as JSON: {source}")]
    InvalidJson {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A named parameter is absent.
    #[error("missing parameter `{0}`")]
    MissingParam(String),

    /// A stream image attribute is not a well-formed typed value.
    #[error("invalid attribute `{name}`: {reason}")]
    InvalidAttribute { name: String, reason: String },
}

/// Errors returned by the dispatcher and the sub-routers.
///
/// HTTP path or method misses are not errors: they produce a 404 response.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No classifier recognised the event.
    #[error("unknown event")]
    UnknownEvent,

    /// A machine-triggered source has no route for the event's key.
    #[error("handler func missing for {event_source} key `{key}`")]
    HandlerMissing {
        event_source: EventSource,
        key: String,
    },

    /// The event matched a source but is missing routing fields.
    #[error("malformed {event_source} event: {error}")]
    MalformedEvent {
        event_source: EventSource,
        #[source]
        error: InputError,
    },

    /// A classifier, router or handler panicked.
    #[error("unexpected fault: {0}")]
    UnexpectedFault(String),
}

impl RouterError {
    /// Wrap an input error as a malformed event of the given source.
    pub fn malformed(event_source: EventSource) -> impl FnOnce(InputError) -> RouterError {
        move |error| RouterError::MalformedEvent {
            event_source,
            error,
        }
    }
}

/// Result type for routing operations.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_names_roundtrip_through_serde() {
        for source in EventSource::DEFAULT_PRIORITY {
            let encoded = serde_json::to_value(source).unwrap();
            assert_eq!(encoded, serde_json::Value::from(source.as_str()));
        }
        let parsed: EventSource = serde_json::from_str("\"pubsub\"").unwrap();
        assert_eq!(parsed, EventSource::PubSub);
    }

    #[test]
    fn test_error_display() {
        let err = RouterError::HandlerMissing {
            event_source: EventSource::Stream,
            key: "arn:stream".to_string(),
        };
        assert_eq!(err.to_string(), "handler func missing for stream key `arn:stream`");

        let err = RouterError::malformed(EventSource::Http)(InputError::MissingField("resource"));
        assert_eq!(err.to_string(), "malformed http event: missing field `resource`");
    }
}
