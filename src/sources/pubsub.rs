//! Pub/sub messages, routed by topic ARN.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::response::{Ack, BoxResponse};
use crate::routing::router::EventRouter;
use crate::routing::table::RouteTable;
use crate::routing::types::{EventSource, InputError, RouterError, RouterResult};
use crate::sources::{optional_str, record, required_str};

/// View over the first record of an SNS delivery.
#[derive(Debug, Clone, Copy)]
pub struct PubSubInput<'e> {
    event: &'e Value,
    record: &'e Value,
    topic_arn: &'e str,
}

impl<'e> PubSubInput<'e> {
    pub fn parse(event: &'e Value) -> Result<Self, InputError> {
        let record = record(event)?;
        let topic_arn = required_str(record, &["Sns", "TopicArn"], "Sns.TopicArn")?;
        Ok(Self {
            event,
            record,
            topic_arn,
        })
    }

    /// The topic ARN; the route key.
    pub fn topic_arn(&self) -> &'e str {
        self.topic_arn
    }

    /// Raw message text.
    pub fn message(&self) -> Option<&'e str> {
        optional_str(self.record, &["Sns", "Message"])
    }

    pub fn subject(&self) -> Option<&'e str> {
        optional_str(self.record, &["Sns", "Subject"])
    }

    /// Decode the message text as JSON.
    pub fn parse_message<T: DeserializeOwned>(&self) -> Result<T, InputError> {
        let message = self.message().ok_or(InputError::MissingField("Sns.Message"))?;
        serde_json::from_str(message).map_err(|source| {
            tracing::warn!(topic_arn = %self.topic_arn, error = %source, "Invalid SNS payload");
            InputError::InvalidJson {
                what: "SNS message",
                source,
            }
        })
    }

    pub fn event(&self) -> &'e Value {
        self.event
    }
}

pub type PubSubHandler = Arc<dyn Fn(&PubSubInput<'_>) -> Ack + Send + Sync>;

/// Routes SNS messages to handlers by topic ARN.
#[derive(Clone)]
pub struct PubSubRouter {
    routes: RouteTable<PubSubHandler>,
}

impl PubSubRouter {
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(EventSource::PubSub),
        }
    }

    /// Register the handler for a topic ARN.
    pub fn on<F>(mut self, topic_arn: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&PubSubInput<'_>) -> Ack + Send + Sync + 'static,
    {
        self.routes.insert(topic_arn, Arc::new(handler));
        self
    }

    pub fn keys(&self) -> Vec<&str> {
        self.routes.keys()
    }

    pub fn dispatch(&self, event: &Value) -> RouterResult<Ack> {
        let input =
            PubSubInput::parse(event).map_err(RouterError::malformed(EventSource::PubSub))?;
        let handler = self.routes.resolve(input.topic_arn())?;
        tracing::debug!(topic_arn = %input.topic_arn(), "Dispatching pub/sub route");
        Ok(handler(&input))
    }
}

impl Default for PubSubRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter for PubSubRouter {
    fn route(&self, event: &Value) -> RouterResult<BoxResponse> {
        self.dispatch(event).map(|ack| Box::new(ack) as BoxResponse)
    }
}

impl fmt::Debug for PubSubRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PubSubRouter")
            .field("routes", &self.routes.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    const TOPIC: &str = "arn:aws:sns:eu-west-1:123456789012:orders";

    fn sns_event(message: &str) -> Value {
        json!({
            "Records": [{
                "EventSource": "aws:sns",
                "Sns": {"TopicArn": TOPIC, "Subject": "order", "Message": message}
            }]
        })
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        id: u32,
    }

    #[test]
    fn test_parse_message() {
        let event = sns_event(r#"{"id": 7}"#);
        let input = PubSubInput::parse(&event).unwrap();
        assert_eq!(input.parse_message::<Order>().unwrap(), Order { id: 7 });
        assert_eq!(input.subject(), Some("order"));

        let event = sns_event("not json");
        let input = PubSubInput::parse(&event).unwrap();
        assert!(matches!(
            input.parse_message::<Order>(),
            Err(InputError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_dispatch_by_topic() {
        let router = PubSubRouter::new().on(TOPIC, |input: &PubSubInput<'_>| {
            match input.parse_message::<Order>() {
                Ok(order) => Ack::success(format!("order {}", order.id)),
                Err(e) => Ack::error(e.to_string()),
            }
        });

        let ack = router.dispatch(&sns_event(r#"{"id": 3}"#)).unwrap();
        assert_eq!(ack.message(), "order 3");

        let other = json!({"Records": [{"EventSource": "aws:sns", "Sns": {"TopicArn": "arn:other"}}]});
        assert!(matches!(
            router.dispatch(&other),
            Err(RouterError::HandlerMissing { event_source: EventSource::PubSub, .. })
        ));
    }
}
