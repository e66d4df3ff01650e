//! Change-feed records (DynamoDB streams), routed by stream ARN.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::response::{Ack, BoxResponse};
use crate::routing::router::EventRouter;
use crate::routing::table::RouteTable;
use crate::routing::types::{EventSource, InputError, RouterError, RouterResult};
use crate::sources::attributes::flatten_image;
use crate::sources::{record, required_str};

/// Kind of change a stream record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventType {
    Insert,
    Modify,
    Remove,
}

impl StreamEventType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "INSERT" => Some(Self::Insert),
            "MODIFY" => Some(Self::Modify),
            "REMOVE" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// View over the first record of a DynamoDB stream batch.
#[derive(Debug, Clone, Copy)]
pub struct StreamInput<'e> {
    event: &'e Value,
    record: &'e Value,
    stream_arn: &'e str,
}

impl<'e> StreamInput<'e> {
    pub fn parse(event: &'e Value) -> Result<Self, InputError> {
        let record = record(event)?;
        let stream_arn = required_str(record, &["eventSourceARN"], "eventSourceARN")?;
        Ok(Self {
            event,
            record,
            stream_arn,
        })
    }

    /// The stream ARN; the route key.
    pub fn stream_arn(&self) -> &'e str {
        self.stream_arn
    }

    pub fn event_type(&self) -> Result<StreamEventType, InputError> {
        let name = required_str(self.record, &["eventName"], "eventName")?;
        StreamEventType::parse(name).ok_or(InputError::InvalidField {
            field: "eventName",
            expected: "one of INSERT, MODIFY, REMOVE",
        })
    }

    /// Decode the item as it is after the change.
    pub fn parse_new_image<T: DeserializeOwned>(&self) -> Result<T, InputError> {
        self.parse_image("NewImage", "dynamodb.NewImage")
    }

    /// Decode the item as it was before the change.
    pub fn parse_old_image<T: DeserializeOwned>(&self) -> Result<T, InputError> {
        self.parse_image("OldImage", "dynamodb.OldImage")
    }

    /// The item's primary key attributes, flattened.
    pub fn keys(&self) -> Result<Map<String, Value>, InputError> {
        flatten_image(self.image("Keys", "dynamodb.Keys")?)
    }

    pub fn event(&self) -> &'e Value {
        self.event
    }

    fn image(&self, name: &str, field: &'static str) -> Result<&'e Map<String, Value>, InputError> {
        self.record
            .get("dynamodb")
            .and_then(|d| d.get(name))
            .and_then(Value::as_object)
            .ok_or(InputError::MissingField(field))
    }

    fn parse_image<T: DeserializeOwned>(
        &self,
        name: &str,
        field: &'static str,
    ) -> Result<T, InputError> {
        let flat = flatten_image(self.image(name, field)?)?;
        serde_json::from_value(Value::Object(flat)).map_err(|source| {
            tracing::warn!(stream_arn = %self.stream_arn, image = name, error = %source, "Could not decode stream image");
            InputError::InvalidJson {
                what: "stream image",
                source,
            }
        })
    }
}

pub type StreamHandler = Arc<dyn Fn(&StreamInput<'_>) -> Ack + Send + Sync>;

/// Routes stream records to handlers by stream ARN.
#[derive(Clone)]
pub struct StreamRouter {
    routes: RouteTable<StreamHandler>,
}

impl StreamRouter {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(EventSource::Stream),
        }
    }

    /// Register the handler for a stream ARN.
    pub fn on<F>(mut self, stream_arn: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&StreamInput<'_>) -> Ack + Send + Sync + 'static,
    {
        self.routes.insert(stream_arn, Arc::new(handler));
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.routes.keys()
    }

    pub fn dispatch(&self, event: &Value) -> RouterResult<Ack> {
        let input =
            StreamInput::parse(event).map_err(RouterError::malformed(EventSource::Stream))?;
        let handler = self.routes.resolve(input.stream_arn())?;
        tracing::debug!(stream_arn = %input.stream_arn(), "Dispatching stream route");
        Ok(handler(&input))
    }
}

impl Default for StreamRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter for StreamRouter {
    fn route(&self, event: &Value) -> RouterResult<BoxResponse> {
        self.dispatch(event).map(|ack| Box::new(ack) as BoxResponse)
    }
}

impl fmt::Debug for StreamRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamRouter")
            .field("routes", &self.routes.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    const ARN: &str = "arn:aws:dynamodb:eu-west-1:123456789012:table/items/stream/2024-01-01T00:00:00.000";

    fn modify_event() -> Value {
        json!({
            "Records": [{
                "eventSource": "aws:dynamodb",
                "eventSourceARN": ARN,
                "eventName": "MODIFY",
                "dynamodb": {
                    "Keys": {"id": {"S": "item-1"}},
                    "OldImage": {"id": {"S": "item-1"}, "stock": {"N": "3"}},
                    "NewImage": {"id": {"S": "item-1"}, "stock": {"N": "2"}}
                }
            }]
        })
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
        stock: i64,
    }

    #[test]
    fn test_images_and_keys() {
        let event = modify_event();
        let input = StreamInput::parse(&event).unwrap();
        assert_eq!(input.event_type().unwrap(), StreamEventType::Modify);
        assert_eq!(
            input.parse_old_image::<Item>().unwrap(),
            Item { id: "item-1".into(), stock: 3 }
        );
        assert_eq!(input.parse_new_image::<Item>().unwrap().stock, 2);
        assert_eq!(input.keys().unwrap()["id"], json!("item-1"));
    }

    #[test]
    fn test_missing_image() {
        let mut event = modify_event();
        event["Records"][0]["dynamodb"]
            .as_object_mut()
            .unwrap()
            .remove("OldImage");
        let input = StreamInput::parse(&event).unwrap();
        assert!(matches!(
            input.parse_old_image::<Item>(),
            Err(InputError::MissingField("dynamodb.OldImage"))
        ));
    }

    #[test]
    fn test_dispatch_by_arn() {
        let router = StreamRouter::new().on(ARN, |input: &StreamInput<'_>| {
            match input.event_type() {
                Ok(StreamEventType::Remove) => Ack::success("removed"),
                Ok(_) => Ack::success("changed"),
                Err(e) => Ack::error(e.to_string()),
            }
        });
        assert_eq!(router.dispatch(&modify_event()).unwrap().message(), "changed");

        let mut event = modify_event();
        event["Records"][0]["eventSourceARN"] = json!("arn:other");
        assert!(matches!(
            router.dispatch(&event),
            Err(RouterError::HandlerMissing { event_source: EventSource::Stream, .. })
        ));
    }

    #[test]
    fn test_unknown_event_name() {
        let mut event = modify_event();
        event["Records"][0]["eventName"] = json!("TRUNCATE");
        let input = StreamInput::parse(&event).unwrap();
        assert!(input.event_type().is_err());
    }
}
