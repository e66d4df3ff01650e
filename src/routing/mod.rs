//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming event (untyped JSON)
//!     → router.rs (Dispatcher: classifiers in priority order)
//!     → matcher.rs (structural classification per source)
//!     → EventRouter for the matched source
//!     → table.rs (key → route for machine-triggered sources)
//!     → Return: payload or RouterError
//!
//! Construction (at startup):
//!     sub-routers + classifiers
//!     → DispatcherBuilder (optional priority list)
//!     → Freeze as immutable Dispatcher
//! ```
//!
//! # Design Decisions
//! - Routes and dispatch order fixed at startup, immutable at runtime
//! - Classification is structural only, never by configuration
//! - Deterministic: same event always reaches the same handler
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod router;
pub mod table;
pub mod types;

pub use matcher::Classifier;
pub use router::{Dispatcher, DispatcherBuilder, EventRouter};
pub use table::RouteTable;
pub use types::{EventSource, InputError, RouterError, RouterResult};
