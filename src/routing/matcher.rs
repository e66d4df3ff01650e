//! Event classification.
//!
//! # Responsibilities
//! - Decide, from structure alone, which source family an event belongs to
//!
//! # Design Decisions
//! - Classifiers are pure and never fail: a shape they do not recognise is
//!   simply a non-match
//! - Record-based sources only inspect the first record
//! - Classifiers do not validate routing fields; the sub-router reports
//!   a malformed event instead

use serde_json::Value;

/// Trait for recognising an event's source family.
pub trait Classifier: Send + Sync {
    /// Returns true if the event belongs to this classifier's family.
    fn matches(&self, event: &Value) -> bool;
}

impl<F> Classifier for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, event: &Value) -> bool {
        self(event)
    }
}

/// Matches API gateway proxy requests (events carrying `httpMethod`).
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClassifier;

impl Classifier for HttpClassifier {
    fn matches(&self, event: &Value) -> bool {
        event.get("httpMethod").is_some_and(|m| !m.is_null())
    }
}

/// Matches scheduled ticks (`{"type": "schedule", ...}`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleClassifier;

impl Classifier for ScheduleClassifier {
    fn matches(&self, event: &Value) -> bool {
        event.get("type").and_then(Value::as_str) == Some("schedule")
    }
}

/// Matches record batches whose first record names a given source.
#[derive(Debug, Clone)]
pub struct RecordSourceClassifier {
    field: &'static str,
    expected: &'static str,
}

impl RecordSourceClassifier {
    pub fn new(field: &'static str, expected: &'static str) -> Self {
        Self { field, expected }
    }

    /// S3 notifications.
    pub fn storage() -> Self {
        Self::new("eventSource", "aws:s3")
    }

    /// DynamoDB stream records.
    pub fn stream() -> Self {
        Self::new("eventSource", "aws:dynamodb")
    }

    /// SNS messages. SNS capitalises the field name.
    pub fn pubsub() -> Self {
        Self::new("EventSource", "aws:sns")
    }
}

impl Classifier for RecordSourceClassifier {
    fn matches(&self, event: &Value) -> bool {
        first_record(event)
            .and_then(|record| record.get(self.field))
            .and_then(Value::as_str)
            == Some(self.expected)
    }
}

/// First element of the event's `Records` array.
pub(crate) fn first_record(event: &Value) -> Option<&Value> {
    event.get("Records")?.as_array()?.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_classifier() {
        let classifier = HttpClassifier;
        assert!(classifier.matches(&json!({"httpMethod": "GET", "resource": "/"})));
        assert!(!classifier.matches(&json!({"httpMethod": null})));
        assert!(!classifier.matches(&json!({"resource": "/"})));
    }

    #[test]
    fn test_schedule_classifier() {
        let classifier = ScheduleClassifier;
        assert!(classifier.matches(&json!({"type": "schedule", "resource": "nightly"})));
        assert!(!classifier.matches(&json!({"type": "other"})));
        assert!(!classifier.matches(&json!({"resource": "nightly"})));
    }

    #[test]
    fn test_record_classifiers() {
        let s3 = json!({"Records": [{"eventSource": "aws:s3"}]});
        let ddb = json!({"Records": [{"eventSource": "aws:dynamodb"}]});
        let sns = json!({"Records": [{"EventSource": "aws:sns"}]});

        assert!(RecordSourceClassifier::storage().matches(&s3));
        assert!(!RecordSourceClassifier::storage().matches(&ddb));
        assert!(RecordSourceClassifier::stream().matches(&ddb));
        assert!(!RecordSourceClassifier::stream().matches(&sns));
        assert!(RecordSourceClassifier::pubsub().matches(&sns));
        assert!(!RecordSourceClassifier::pubsub().matches(&s3));
    }

    #[test]
    fn test_record_classifier_shapes() {
        let storage = RecordSourceClassifier::storage();
        assert!(!storage.matches(&json!({"Records": []})));
        assert!(!storage.matches(&json!({"Records": "aws:s3"})));
        assert!(!storage.matches(&json!({"Records": [{"eventSource": 3}]})));
        assert!(!storage.matches(&json!({})));
    }

    #[test]
    fn test_closure_classifier() {
        let custom = |event: &Value| event.get("source").and_then(Value::as_str) == Some("aws.events");
        assert!(custom.matches(&json!({"source": "aws.events"})));
        assert!(!custom.matches(&json!({})));
    }
}
