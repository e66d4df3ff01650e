//! HTTP sub-router.
//!
//! # Responsibilities
//! - Resolve `(template, method)` to a route after re-templating the path
//! - Enforce the route's access requirement
//! - Run route-local or global middleware, then the handler
//!
//! # Data Flow
//! ```text
//! event
//!     → RequestLine::parse        (MalformedEvent on bad shape)
//!     → template::canonicalize
//!     → routes[template][method]  (miss → 404 response)
//!     → access requirement        (deny → 403 response)
//!     → middleware chain          (first Some → early response)
//!     → handler(HttpInput)
//! ```
//!
//! # Design Decisions
//! - Not-found and forbidden are responses for the caller, not router errors
//! - The routing table is frozen once the router is built

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use serde_json::Value;

use crate::http::middleware::MiddlewareChain;
use crate::http::request::{HttpInput, RequestLine};
use crate::http::response::HttpResponse;
use crate::http::template;
use crate::observability::metrics;
use crate::response::BoxResponse;
use crate::routing::router::EventRouter;
use crate::routing::types::{EventSource, RouterError, RouterResult};
use crate::security::access_control::{AccessDecision, AccessRequirement};
use crate::security::claims::{AuthorizerClaims, ClaimsProvider};

/// Handler invoked for a matched HTTP route.
pub type HttpHandler = Arc<dyn Fn(&HttpInput<'_>) -> HttpResponse + Send + Sync>;

/// A single `(template, method)` entry.
#[derive(Clone)]
pub struct HttpRoute {
    handler: HttpHandler,
    access: Option<AccessRequirement>,
    middleware: Option<MiddlewareChain>,
}

impl HttpRoute {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpInput<'_>) -> HttpResponse + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            access: None,
            middleware: None,
        }
    }

    /// Restrict the route to callers holding one of the requirement's roles.
    pub fn require(mut self, access: AccessRequirement) -> Self {
        self.access = Some(access);
        self
    }

    /// Replace the global middleware for this route. An empty chain disables
    /// middleware entirely.
    pub fn with_middleware(mut self, chain: MiddlewareChain) -> Self {
        self.middleware = Some(chain);
        self
    }

    pub fn access(&self) -> Option<&AccessRequirement> {
        self.access.as_ref()
    }

    pub fn middleware(&self) -> Option<&MiddlewareChain> {
        self.middleware.as_ref()
    }
}

impl fmt::Debug for HttpRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRoute")
            .field("access", &self.access)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

/// Two-level table: template → method → route.
#[derive(Debug, Clone, Default)]
pub struct HttpRoutes {
    table: HashMap<String, HashMap<Method, HttpRoute>>,
}

impl HttpRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`HttpRoutes::insert`].
    pub fn route(mut self, template: impl Into<String>, method: Method, route: HttpRoute) -> Self {
        self.insert(template, method, route);
        self
    }

    /// Register a route. Re-registering a `(template, method)` pair replaces
    /// the earlier route.
    pub fn insert(&mut self, template: impl Into<String>, method: Method, route: HttpRoute) {
        let template = template.into();
        let methods = self.table.entry(template.clone()).or_default();
        if methods.insert(method.clone(), route).is_some() {
            tracing::warn!(
                template = %template,
                method = %method,
                "HTTP route registered twice, keeping the last one"
            );
        }
    }

    pub fn get(&self, template: &str, method: &Method) -> Option<&HttpRoute> {
        self.table.get(template)?.get(method)
    }

    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered `(template, method)` pairs, sorted for stable output.
    pub fn keys(&self) -> Vec<(&str, &Method)> {
        let mut keys: Vec<_> = self
            .table
            .iter()
            .flat_map(|(template, methods)| methods.keys().map(move |m| (template.as_str(), m)))
            .collect();
        keys.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.as_str().cmp(b.1.as_str())));
        keys
    }
}

/// Routes HTTP proxy events to handlers.
pub struct HttpRouter {
    routes: HttpRoutes,
    middleware: MiddlewareChain,
    claims: Arc<dyn ClaimsProvider>,
}

impl HttpRouter {
    pub fn new(routes: HttpRoutes) -> Self {
        if routes.is_empty() {
            tracing::warn!("HTTP router built without routes, every request will get a 404");
        }
        Self {
            routes,
            middleware: MiddlewareChain::new(),
            claims: Arc::new(AuthorizerClaims),
        }
    }

    /// Middleware run for every route without its own chain.
    pub fn with_middleware(mut self, chain: MiddlewareChain) -> Self {
        self.middleware = chain;
        self
    }

    /// Override where caller claims are read from.
    pub fn with_claims_provider(mut self, provider: impl ClaimsProvider + 'static) -> Self {
        self.claims = Arc::new(provider);
        self
    }

    pub fn routes(&self) -> &HttpRoutes {
        &self.routes
    }

    /// Resolve and run the route for `event`.
    pub fn dispatch(&self, event: &Value) -> RouterResult<HttpResponse> {
        let line = RequestLine::parse(event).map_err(RouterError::malformed(EventSource::Http))?;
        let template = template::canonicalize(line.resource, &line.path_params);

        let Some(route) = self.routes.get(&template, &line.method) else {
            tracing::info!(
                resource = %line.resource,
                template = %template,
                method = %line.method,
                "No HTTP route matched"
            );
            metrics::record_http_rejection("not_found");
            return Ok(HttpResponse::not_found());
        };

        let input = HttpInput::new(event).with_claims_provider(self.claims.as_ref());

        if let Some(requirement) = route.access() {
            let claims = match input.claims() {
                Ok(claims) => Some(claims),
                Err(e) => {
                    tracing::debug!(error = %e, "Could not read caller claims");
                    None
                }
            };
            if let AccessDecision::Deny(reason) = requirement.evaluate(claims.as_ref()) {
                tracing::warn!(
                    template = %template,
                    method = %line.method,
                    claim_key = %requirement.claim_key(),
                    reason = %reason,
                    "Access denied"
                );
                metrics::record_http_rejection(reason.as_str());
                return Ok(HttpResponse::forbidden());
            }
        }

        let chain = route.middleware().unwrap_or(&self.middleware);
        if let Some(early) = chain.run(&input) {
            metrics::record_http_rejection("middleware");
            return Ok(early);
        }

        tracing::debug!(template = %template, method = %line.method, "Dispatching HTTP route");
        Ok((route.handler)(&input))
    }
}

impl EventRouter for HttpRouter {
    fn route(&self, event: &Value) -> RouterResult<BoxResponse> {
        self.dispatch(event).map(|response| Box::new(response) as BoxResponse)
    }
}

impl fmt::Debug for HttpRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRouter")
            .field("routes", &self.routes.len())
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}
