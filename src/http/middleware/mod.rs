//! Pre-handler middleware.
//!
//! # Responsibilities
//! - Define the [`Middleware`] contract: inspect the request, optionally answer it
//! - Run an ordered chain, stopping at the first middleware that answers
//!
//! # Design Decisions
//! - Middleware is synchronous and sees the same borrowed view as the handler
//! - A route-local chain replaces the global chain for that route; it is not
//!   appended to it

use std::fmt;
use std::sync::Arc;

use crate::http::request::HttpInput;
use crate::http::response::HttpResponse;

/// A pre-handler step. `None` continues, `Some` short-circuits.
pub trait Middleware: Send + Sync {
    fn handle(&self, input: &HttpInput<'_>) -> Option<HttpResponse>;
}

impl<F> Middleware for F
where
    F: Fn(&HttpInput<'_>) -> Option<HttpResponse> + Send + Sync,
{
    fn handle(&self, input: &HttpInput<'_>) -> Option<HttpResponse> {
        self(input)
    }
}

/// Pin a closure to the middleware signature.
///
/// Closures passed straight to [`MiddlewareChain::with`] may need their
/// argument and return types spelled out; routing them through `from_fn`
/// lets inference pick the signature up from the bound.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&HttpInput<'_>) -> Option<HttpResponse> + Send + Sync,
{
    f
}

/// Ordered list of middleware.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    steps: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.steps.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run the chain in order and return the first early response.
    pub fn run(&self, input: &HttpInput<'_>) -> Option<HttpResponse> {
        self.steps.iter().enumerate().find_map(|(position, step)| {
            let response = step.handle(input)?;
            tracing::debug!(
                position,
                status = response.status().as_u16(),
                "Middleware short-circuited request"
            );
            Some(response)
        })
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_empty_chain_continues() {
        let event = json!({});
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());
        assert!(chain.run(&HttpInput::new(&event)).is_none());
    }

    #[test]
    fn test_first_response_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let chain = MiddlewareChain::new()
            .with(from_fn(|_| None))
            .with(from_fn(|_| {
                Some(HttpResponse::error(StatusCode::UNAUTHORIZED, "stop"))
            }))
            .with(from_fn(move |_| {
                counted.fetch_add(1, Ordering::SeqCst);
                None
            }));

        let event = json!({});
        let response = chain.run(&HttpInput::new(&event)).unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_middleware_sees_input() {
        let chain = MiddlewareChain::new().with(from_fn(|input| match input.header("x-api-key") {
            Some(_) => None,
            None => Some(HttpResponse::error(StatusCode::UNAUTHORIZED, "missing api key")),
        }));

        let with_key = json!({"headers": {"X-Api-Key": "k"}});
        assert!(chain.run(&HttpInput::new(&with_key)).is_none());

        let without = json!({"headers": {}});
        assert!(chain.run(&HttpInput::new(&without)).is_some());
    }
}
