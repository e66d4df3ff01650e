//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / routers / handlers produce:
//!     → logging.rs (subscriber setup, structured log events)
//!     → metrics.rs (counters through the metrics facade)
//!     → tracing.rs (invocation span with a generated id)
//!     → panic_site.rs (location and backtrace of a recovered panic)
//! ```
//!
//! # Design Decisions
//! - The invocation id flows through every record of one dispatch
//! - Metric updates are no-ops until the host installs a recorder

pub mod logging;
pub mod metrics;
pub mod panic_site;
pub mod tracing;
