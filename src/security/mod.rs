//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP route with an access requirement:
//!     → claims.rs (ClaimsProvider reads caller claims from the event)
//!     → access_control.rs (any-of role match on the claim key)
//!     → Allow, or a 403 response from the HTTP router
//! ```
//!
//! # Design Decisions
//! - Fail closed: unreadable or missing claims deny
//! - No trust in client input; claims only come from the authorizer context

pub mod access_control;
pub mod claims;

pub use access_control::{AccessDecision, AccessRequirement, DenyReason};
pub use claims::{AuthorizerClaims, Claims, ClaimsError, ClaimsProvider};
