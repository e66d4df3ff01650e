//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the dispatch priority covers every source that has routes
//! - Validate templates, methods and access blocks of HTTP routes
//! - Detect duplicate routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::{HttpRouteConfig, RouterConfig};
use crate::routing::types::EventSource;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// A semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("dispatch.priority is empty")]
    EmptyPriority,

    #[error("dispatch.priority lists `{0}` more than once")]
    DuplicatePriority(EventSource),

    #[error("routes are configured for `{0}` but it is not in dispatch.priority")]
    UnreachableSource(EventSource),

    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),

    #[error("http route {index}: invalid method `{method}`")]
    InvalidMethod { index: usize, method: String },

    #[error("http route {index}: invalid template `{template}`: {reason}")]
    InvalidTemplate {
        index: usize,
        template: String,
        reason: &'static str,
    },

    #[error("duplicate http route {method} {template}")]
    DuplicateHttpRoute { template: String, method: String },

    #[error("http route {index}: access lists no roles")]
    EmptyRoles { index: usize },

    #[error("http route {index}: access claim_key is empty")]
    EmptyClaimKey { index: usize },

    #[error("{0} route key is empty")]
    EmptyKey(EventSource),

    #[error("duplicate {0} route key `{1}`")]
    DuplicateKey(EventSource, String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_priority(config, &mut errors);

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.http.iter().enumerate() {
        validate_http_route(index, route, &mut errors);
        if !seen.insert((route.template.as_str(), route.method.as_str())) {
            errors.push(ValidationError::DuplicateHttpRoute {
                template: route.template.clone(),
                method: route.method.clone(),
            });
        }
    }

    for source in [
        EventSource::Schedule,
        EventSource::Stream,
        EventSource::Storage,
        EventSource::PubSub,
    ] {
        let mut seen = HashSet::new();
        for key in config.routes.keys(source) {
            if key.trim().is_empty() {
                errors.push(ValidationError::EmptyKey(source));
            } else if !seen.insert(key.as_str()) {
                errors.push(ValidationError::DuplicateKey(source, key.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_priority(config: &RouterConfig, errors: &mut Vec<ValidationError>) {
    let priority = &config.dispatch.priority;
    if priority.is_empty() {
        errors.push(ValidationError::EmptyPriority);
    }

    let mut seen = HashSet::new();
    for source in priority {
        if !seen.insert(*source) {
            errors.push(ValidationError::DuplicatePriority(*source));
        }
    }

    for source in EventSource::DEFAULT_PRIORITY {
        if config.routes.has_routes(source) && !seen.contains(&source) {
            errors.push(ValidationError::UnreachableSource(source));
        }
    }
}

fn validate_http_route(index: usize, route: &HttpRouteConfig, errors: &mut Vec<ValidationError>) {
    let method_ok = !route.method.is_empty()
        && route.method.bytes().all(|b| b.is_ascii_uppercase())
        && Method::from_bytes(route.method.as_bytes()).is_ok();
    if !method_ok {
        errors.push(ValidationError::InvalidMethod {
            index,
            method: route.method.clone(),
        });
    }

    if let Err(reason) = check_template(&route.template) {
        errors.push(ValidationError::InvalidTemplate {
            index,
            template: route.template.clone(),
            reason,
        });
    }

    if let Some(access) = &route.access {
        if access.roles.is_empty() {
            errors.push(ValidationError::EmptyRoles { index });
        }
        if access.claim_key.trim().is_empty() {
            errors.push(ValidationError::EmptyClaimKey { index });
        }
    }
}

/// Templates start with `/` and hold balanced, non-empty `{name}` placeholders.
fn check_template(template: &str) -> Result<(), &'static str> {
    if !template.starts_with('/') {
        return Err("must start with `/`");
    }

    let mut open = false;
    let mut name_len = 0;
    for c in template.chars() {
        match c {
            '{' if open => return Err("nested `{`"),
            '{' => {
                open = true;
                name_len = 0;
            }
            '}' if !open => return Err("unmatched `}`"),
            '}' if name_len == 0 => return Err("empty placeholder"),
            '}' => open = false,
            _ if open => name_len += 1,
            _ => {}
        }
    }

    if open {
        Err("unclosed `{`")
    } else {
        Ok(())
    }
}
