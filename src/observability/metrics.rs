//! Dispatch metrics.
//!
//! # Metrics
//! - `lambda_router_invocations_total` (counter): routed events by `source`
//!   and `outcome` (`success`, `failure`, `error`)
//! - `lambda_router_unmatched_total` (counter): events no classifier accepted
//! - `lambda_router_faults_total` (counter): panics caught at the boundary
//! - `lambda_router_http_rejections_total` (counter): HTTP requests answered
//!   by the router itself, by `reason`
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - The library installs no exporter; the hosting process owns that choice

use crate::routing::types::EventSource;

/// Handler returned a successful response.
pub const OUTCOME_SUCCESS: &str = "success";
/// Handler returned an error response.
pub const OUTCOME_FAILURE: &str = "failure";
/// Sub-router returned a `RouterError`.
pub const OUTCOME_ERROR: &str = "error";

/// Record one routed invocation.
pub fn record_invocation(source: EventSource, outcome: &'static str) {
    ::metrics::counter!(
        "lambda_router_invocations_total",
        "source" => source.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record an event that matched no classifier.
pub fn record_unmatched() {
    ::metrics::counter!("lambda_router_unmatched_total").increment(1);
}

/// Record a recovered panic.
pub fn record_fault() {
    ::metrics::counter!("lambda_router_faults_total").increment(1);
}

/// Record an HTTP request answered without reaching its handler.
pub fn record_http_rejection(reason: &'static str) {
    ::metrics::counter!("lambda_router_http_rejections_total", "reason" => reason).increment(1);
}
