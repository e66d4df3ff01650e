//! Response contract shared by every sub-router.
//!
//! # Responsibilities
//! - Define the [`Response`] trait every handler result implements
//! - Provide [`Ack`], the response type of machine-triggered sources
//!
//! # Design Decisions
//! - Responses are immutable once built and serialized exactly once, at the
//!   invocation boundary, through [`Response::payload`]
//! - Router-internal failures are never responses; they are `RouterError`s

use std::fmt;

use serde_json::{json, Value};

/// A handler outcome that can be handed back to the invocation boundary.
pub trait Response: fmt::Debug + Send {
    /// Serialize the response into the payload returned to the caller.
    fn payload(&self) -> Value;

    /// Whether this response reports a successful outcome.
    fn is_success(&self) -> bool;
}

/// Boxed response as returned by sub-routers.
pub type BoxResponse = Box<dyn Response>;

/// Outcome carried by an [`Ack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    Success,
    Error,
}

impl AckStatus {
    fn as_str(&self) -> &'static str {
        match self {
            AckStatus::Success => "success",
            AckStatus::Error => "error",
        }
    }
}

/// Acknowledgement returned by schedule, stream, storage and pub/sub handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    status: AckStatus,
    message: String,
}

impl Ack {
    /// Acknowledge successful processing.
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::info!(ack = %message, "Handler acknowledged event");
        Self {
            status: AckStatus::Success,
            message,
        }
    }

    /// Report that the handler could not process the event.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(ack = %message, "Handler reported failure");
        Self {
            status: AckStatus::Error,
            message,
        }
    }

    pub fn status(&self) -> AckStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Response for Ack {
    fn payload(&self) -> Value {
        json!({
            "status": self.status.as_str(),
            "message": self.message,
        })
    }

    fn is_success(&self) -> bool {
        self.status == AckStatus::Success
    }
}
