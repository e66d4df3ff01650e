//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build routers → Freeze dispatcher
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then routing
//! - Nothing is built from a configuration that failed validation

pub mod startup;

pub use startup::{build_dispatcher, describe_routes};
