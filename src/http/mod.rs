//! HTTP proxy-event handling subsystem.
//!
//! # Data Flow
//! ```text
//! API gateway proxy event
//!     → request.rs (RequestLine: resource, method, path parameters)
//!     → template.rs (concrete path → registered template)
//!     → router.rs (table lookup, access control, middleware)
//!     → handler(HttpInput)
//!     → response.rs (status, JSON body, CORS headers)
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod template;

pub use middleware::{Middleware, MiddlewareChain};
pub use request::HttpInput;
pub use response::HttpResponse;
pub use router::{HttpRoute, HttpRouter, HttpRoutes};
