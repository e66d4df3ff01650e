//! HTTP response construction.
//!
//! # Responsibilities
//! - Build proxy-integration responses (`statusCode`, `body`, `headers`,
//!   `isBase64Encoded`)
//! - Attach the fixed CORS headers to every response
//! - Encode success bodies as JSON and error bodies as `{"error": ...}`
//!
//! # Design Decisions
//! - The body is serialized once, at construction
//! - A body that fails to serialize becomes a 500 instead of a panic

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

use crate::response::Response;

/// CORS headers attached by every constructor.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    (
        "Access-Control-Allow-Headers",
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key",
    ),
    ("Access-Control-Allow-Methods", "*"),
    ("Access-Control-Allow-Origin", "*"),
];

const SERIALIZATION_FAILURE_BODY: &str = r#"{"error":"could not serialize response body"}"#;

#[derive(Serialize)]
struct ErrorBody<'a, E: ?Sized> {
    error: &'a E,
}

/// Response returned by HTTP handlers, middleware and the HTTP router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: StatusCode,
    body: String,
    headers: BTreeMap<String, String>,
    is_base64_encoded: bool,
}

impl HttpResponse {
    /// Success response whose body is `body` encoded as JSON.
    pub fn success<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Self {
        Self::encode(status, body)
    }

    /// Error response whose body is `{"error": error}`.
    pub fn error<E: Serialize + ?Sized>(status: StatusCode, error: &E) -> Self {
        Self::encode(status, &ErrorBody { error })
    }

    /// 404 returned when no route matches the template and method.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "not found")
    }

    /// 403 returned when access control denies the request.
    pub fn forbidden() -> Self {
        Self::error(StatusCode::FORBIDDEN, "forbidden")
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn encode<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(encoded) => Self::with_cors(status, encoded),
            Err(e) => {
                tracing::error!(
                    status = status.as_u16(),
                    error = %e,
                    "Could not serialize response body"
                );
                Self::with_cors(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SERIALIZATION_FAILURE_BODY.to_string(),
                )
            }
        }
    }

    fn with_cors(status: StatusCode, body: String) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            status,
            body,
            headers,
            is_base64_encoded: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The pre-serialized JSON body.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn is_base64_encoded(&self) -> bool {
        self.is_base64_encoded
    }
}

impl Response for HttpResponse {
    fn payload(&self) -> Value {
        json!({
            "statusCode": self.status.as_u16(),
            "body": self.body,
            "headers": self.headers,
            "isBase64Encoded": self.is_base64_encoded,
        })
    }

    fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
