//! Role-based access control for HTTP routes.
//!
//! A route that carries an [`AccessRequirement`] is only reachable by callers
//! whose claims hold one of the permitted roles under the configured claim
//! key. Routes without a requirement are public.

use std::collections::BTreeSet;
use std::fmt;

use crate::security::claims::Claims;

/// Claim key used when none is configured.
pub const DEFAULT_CLAIM_KEY: &str = "cognito:groups";

/// Roles permitted on a route and the claim they are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequirement {
    claim_key: String,
    roles: BTreeSet<String>,
}

impl AccessRequirement {
    /// Requirement reading roles from `claim_key`.
    pub fn new<I, S>(claim_key: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            claim_key: claim_key.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Requirement reading roles from [`DEFAULT_CLAIM_KEY`].
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DEFAULT_CLAIM_KEY, roles)
    }

    pub fn claim_key(&self) -> &str {
        &self.claim_key
    }

    pub fn permitted(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    /// Decide whether `claims` satisfy this requirement.
    pub fn evaluate(&self, claims: Option<&Claims>) -> AccessDecision {
        evaluate(self, claims)
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The event carries no readable authorization context.
    MissingAuthorization,
    /// The configured claim is absent.
    MissingClaim,
    /// None of the claim's values is a permitted role.
    NotPermitted,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MissingAuthorization => "missing_authorization",
            DenyReason::MissingClaim => "missing_claim",
            DenyReason::NotPermitted => "not_permitted",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating an [`AccessRequirement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Evaluate a requirement against the caller's claims.
///
/// Any-of semantics with exact string comparison. Missing claims deny.
pub fn evaluate(requirement: &AccessRequirement, claims: Option<&Claims>) -> AccessDecision {
    let Some(claims) = claims else {
        return AccessDecision::Deny(DenyReason::MissingAuthorization);
    };

    if claims.get(&requirement.claim_key).is_none() {
        return AccessDecision::Deny(DenyReason::MissingClaim);
    }

    let permitted = claims
        .values(&requirement.claim_key)
        .into_iter()
        .any(|value| requirement.roles.contains(value));

    if permitted {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny(DenyReason::NotPermitted)
    }
}
