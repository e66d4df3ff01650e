//! Caller identity claims attached by an upstream authorizer.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while reading claims out of an event.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("requestContext missing in event")]
    MissingRequestContext,

    #[error("authorizer missing in requestContext")]
    MissingAuthorizer,

    #[error("claims missing in authorizer")]
    MissingClaims,

    #[error("claims must be an object or a JSON-encoded object")]
    NotAnObject,

    #[error("could not parse claims as JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Authenticated identity attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    props: Map<String, Value>,
}

impl Claims {
    pub fn new(props: Map<String, Value>) -> Self {
        Self { props }
    }

    /// Raw claim value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Claim value when it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// All string values of a claim.
    ///
    /// A string claim yields itself, an array claim yields its string
    /// elements, anything else yields nothing.
    pub fn values(&self, key: &str) -> Vec<&str> {
        match self.props.get(key) {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `claim_key` carries exactly `role`.
    pub fn has_role(&self, claim_key: &str, role: &str) -> bool {
        self.values(claim_key).contains(&role)
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(props: Map<String, Value>) -> Self {
        Self::new(props)
    }
}

/// Source of caller claims for an event.
///
/// The HTTP router asks its provider for claims whenever a route carries an
/// access requirement, so tests can substitute a closure for real parsing.
pub trait ClaimsProvider: Send + Sync {
    fn claims(&self, event: &Value) -> Result<Claims, ClaimsError>;
}

impl<F> ClaimsProvider for F
where
    F: Fn(&Value) -> Result<Claims, ClaimsError> + Send + Sync,
{
    fn claims(&self, event: &Value) -> Result<Claims, ClaimsError> {
        self(event)
    }
}

/// Reads `requestContext.authorizer.claims` as set by a Cognito user pool
/// authorizer. The claims may arrive as an object or as a JSON string.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizerClaims;

impl ClaimsProvider for AuthorizerClaims {
    fn claims(&self, event: &Value) -> Result<Claims, ClaimsError> {
        let authorizer = event
            .get("requestContext")
            .filter(|v| !v.is_null())
            .ok_or(ClaimsError::MissingRequestContext)?
            .get("authorizer")
            .filter(|v| !v.is_null())
            .ok_or(ClaimsError::MissingAuthorizer)?;

        match authorizer.get("claims") {
            Some(Value::Object(props)) => Ok(Claims::new(props.clone())),
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded)? {
                Value::Object(props) => Ok(Claims::new(props)),
                _ => Err(ClaimsError::NotAnObject),
            },
            Some(Value::Null) | None => Err(ClaimsError::MissingClaims),
            Some(_) => Err(ClaimsError::NotAnObject),
        }
    }
}
