//! Invocation spans.
//!
//! Every dispatch runs inside an `invocation` span so all records emitted by
//! routers and handlers for one event share an invocation id.

use ::tracing::Span;
use uuid::Uuid;

/// Open the span for one invocation. `source` is filled in once an event
/// has been classified.
pub fn invocation_span() -> Span {
    ::tracing::info_span!(
        "invocation",
        invocation_id = %Uuid::new_v4(),
        source = ::tracing::field::Empty,
    )
}
