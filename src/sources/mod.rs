//! Machine-triggered event sources.
//!
//! # Data Flow
//! ```text
//! classified event
//!     → <Source>Input::parse   (MalformedEvent on bad shape)
//!     → route key              (schedule name, stream ARN, folder, topic ARN)
//!     → RouteTable::resolve    (HandlerMissing on miss)
//!     → handler(&Input) → Ack
//! ```
//!
//! # Design Decisions
//! - One module per source, each with a borrowed input view and a router
//! - Only the first record of a batch is routed

use serde_json::Value;

use crate::routing::matcher::first_record;
use crate::routing::types::InputError;

pub mod attributes;
pub mod pubsub;
pub mod schedule;
pub mod storage;
pub mod stream;

pub use pubsub::{PubSubInput, PubSubRouter};
pub use schedule::{ScheduleInput, ScheduleRouter};
pub use storage::{StorageInput, StorageRouter};
pub use stream::{StreamEventType, StreamInput, StreamRouter};

/// First record of a batch event.
pub(crate) fn record(event: &Value) -> Result<&Value, InputError> {
    first_record(event).ok_or(InputError::NoRecords)
}

/// Required string at a nested path. `field` names the path in errors.
pub(crate) fn required_str<'e>(
    value: &'e Value,
    path: &[&str],
    field: &'static str,
) -> Result<&'e str, InputError> {
    let found = path
        .iter()
        .try_fold(value, |current, segment| current.get(*segment))
        .filter(|v| !v.is_null())
        .ok_or(InputError::MissingField(field))?;
    found.as_str().ok_or(InputError::InvalidField {
        field,
        expected: "a string",
    })
}

/// Optional string at a nested path.
pub(crate) fn optional_str<'e>(value: &'e Value, path: &[&str]) -> Option<&'e str> {
    path.iter()
        .try_fold(value, |current, segment| current.get(*segment))?
        .as_str()
}
