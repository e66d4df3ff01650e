//! Configuration schema definitions.
//!
//! This module defines the route manifest and runtime settings of the
//! router. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

use crate::routing::types::EventSource;
use crate::security::access_control::DEFAULT_CLAIM_KEY;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Dispatch order and event logging.
    pub dispatch: DispatchConfig,

    /// Log level and format.
    pub observability: ObservabilityConfig,

    /// Route manifest per source.
    pub routes: RoutesConfig,
}

/// Dispatcher settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Order in which source classifiers are tried. Sources not listed are
    /// not dispatched at all.
    pub priority: Vec<EventSource>,

    /// Log every incoming event before dispatch.
    pub log_events: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            priority: EventSource::DEFAULT_PRIORITY.to_vec(),
            log_events: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Level for this crate's records (`trace`..`error`, or `off`).
    /// `RUST_LOG` takes precedence when set.
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Route manifest.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RoutesConfig {
    pub http: Vec<HttpRouteConfig>,

    /// Schedule names.
    pub schedule: Vec<String>,

    /// Stream ARNs.
    pub stream: Vec<String>,

    /// Object folders, e.g. `/uploads`.
    pub storage: Vec<String>,

    /// Topic ARNs.
    pub pubsub: Vec<String>,
}

impl RoutesConfig {
    /// Keys configured for a machine-triggered source.
    pub fn keys(&self, source: EventSource) -> &[String] {
        match source {
            EventSource::Http => &[],
            EventSource::Schedule => &self.schedule,
            EventSource::Stream => &self.stream,
            EventSource::Storage => &self.storage,
            EventSource::PubSub => &self.pubsub,
        }
    }

    /// Whether any route is configured for `source`.
    pub fn has_routes(&self, source: EventSource) -> bool {
        match source {
            EventSource::Http => !self.http.is_empty(),
            other => !self.keys(other).is_empty(),
        }
    }
}

/// One HTTP route.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HttpRouteConfig {
    /// Path template, e.g. `/items/{id}`.
    pub template: String,

    /// HTTP method, upper case.
    pub method: String,

    /// Role requirement. Absent means public.
    #[serde(default)]
    pub access: Option<AccessConfig>,
}

/// Role requirement for an HTTP route.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AccessConfig {
    pub roles: Vec<String>,

    #[serde(default = "default_claim_key")]
    pub claim_key: String,
}

fn default_claim_key() -> String {
    DEFAULT_CLAIM_KEY.to_string()
}
