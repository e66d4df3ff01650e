//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → lifecycle::startup builds the dispatcher from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; routing tables never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::RouterConfig;
pub use schema::{AccessConfig, DispatchConfig, HttpRouteConfig, LogFormat, ObservabilityConfig, RoutesConfig};
pub use validation::ValidationError;
