//! Request-scoped views over an HTTP proxy event.
//!
//! # Responsibilities
//! - Extract the routing-relevant fields (resource, method, path parameters)
//! - Give handlers typed accessors for parameters, headers, body and claims
//!
//! # Design Decisions
//! - Views borrow the event; nothing is copied until a handler asks for it
//! - Absent optional values are `None`, wrong types on routing fields are
//!   `InputError`s rather than panics

use std::fmt;

use axum::http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::routing::types::InputError;
use crate::security::claims::{AuthorizerClaims, Claims, ClaimsError, ClaimsProvider};

/// The fields the HTTP router needs to resolve a route.
#[derive(Debug, Clone)]
pub struct RequestLine<'e> {
    pub resource: &'e str,
    pub method: Method,
    pub path_params: Vec<(&'e str, &'e str)>,
}

impl<'e> RequestLine<'e> {
    /// Parse `resource`, `httpMethod` and `pathParameters` out of an event.
    pub fn parse(event: &'e Value) -> Result<Self, InputError> {
        let resource = required_str(event, "resource")?;
        let method = required_str(event, "httpMethod")?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| InputError::InvalidField {
            field: "httpMethod",
            expected: "an HTTP method token",
        })?;

        let path_params = match event.get("pathParameters") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(params)) => params
                .iter()
                .map(|(key, value)| match value {
                    Value::String(v) => Ok((key.as_str(), v.as_str())),
                    _ => Err(InputError::InvalidField {
                        field: "pathParameters",
                        expected: "an object of strings",
                    }),
                })
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(InputError::InvalidField {
                    field: "pathParameters",
                    expected: "an object of strings",
                })
            }
        };

        Ok(Self {
            resource,
            method,
            path_params,
        })
    }
}

fn required_str<'e>(event: &'e Value, field: &'static str) -> Result<&'e str, InputError> {
    match event.get(field) {
        None | Some(Value::Null) => Err(InputError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(InputError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

/// Handler-facing view of an HTTP event.
#[derive(Clone, Copy)]
pub struct HttpInput<'e> {
    event: &'e Value,
    claims: &'e dyn ClaimsProvider,
}

impl<'e> HttpInput<'e> {
    /// View over `event`, reading claims from the API gateway authorizer.
    pub fn new(event: &'e Value) -> Self {
        Self {
            event,
            claims: &AuthorizerClaims,
        }
    }

    /// Read claims through `provider` instead of the authorizer context.
    pub fn with_claims_provider(mut self, provider: &'e dyn ClaimsProvider) -> Self {
        self.claims = provider;
        self
    }

    /// The raw event.
    pub fn event(&self) -> &'e Value {
        self.event
    }

    pub fn resource(&self) -> Option<&'e str> {
        self.event.get("resource").and_then(Value::as_str)
    }

    pub fn method(&self) -> Option<&'e str> {
        self.event.get("httpMethod").and_then(Value::as_str)
    }

    /// A path parameter, e.g. `id` for `/items/{id}`.
    pub fn path_param(&self, name: &str) -> Option<&'e str> {
        self.string_entry("pathParameters", name)
    }

    /// All string-valued path parameters.
    pub fn path_params(&self) -> impl Iterator<Item = (&'e str, &'e str)> {
        self.string_entries("pathParameters")
    }

    pub fn query_param(&self, name: &str) -> Option<&'e str> {
        self.string_entry("queryStringParameters", name)
    }

    /// All string-valued query parameters.
    pub fn query_params(&self) -> impl Iterator<Item = (&'e str, &'e str)> {
        self.string_entries("queryStringParameters")
    }

    /// Decode a JSON-encoded query parameter, e.g. `?ids=["a","b"]`.
    pub fn parse_query_param<T: DeserializeOwned>(&self, name: &str) -> Result<T, InputError> {
        let raw = self
            .query_param(name)
            .ok_or_else(|| InputError::MissingParam(name.to_string()))?;
        serde_json::from_str(raw).map_err(|source| InputError::InvalidJson {
            what: "query parameter",
            source,
        })
    }

    /// A request header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&'e str> {
        self.event
            .get("headers")
            .and_then(Value::as_object)?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_str())
    }

    /// The raw request body.
    pub fn body(&self) -> Option<&'e str> {
        self.event.get("body").and_then(Value::as_str)
    }

    /// Decode the request body as JSON.
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, InputError> {
        let body = self.body().ok_or(InputError::MissingBody)?;
        serde_json::from_str(body).map_err(|source| InputError::InvalidJson {
            what: "body",
            source,
        })
    }

    /// Caller claims, read through the same provider the router uses for
    /// access checks.
    pub fn claims(&self) -> Result<Claims, ClaimsError> {
        self.auth(self.claims)
    }

    /// Claims read through a specific provider.
    pub fn auth(&self, provider: &dyn ClaimsProvider) -> Result<Claims, ClaimsError> {
        provider.claims(self.event)
    }

    fn string_entry(&self, field: &str, name: &str) -> Option<&'e str> {
        self.event.get(field)?.get(name)?.as_str()
    }

    fn string_entries(&self, field: &str) -> impl Iterator<Item = (&'e str, &'e str)> {
        self.event
            .get(field)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.iter())
            .filter_map(|(key, value)| value.as_str().map(|v| (key.as_str(), v)))
    }
}

impl fmt::Debug for HttpInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpInput")
            .field("event", self.event)
            .finish_non_exhaustive()
    }
}
