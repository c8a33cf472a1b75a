//! Access control types
//!
//! Core types used by the access control system.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Prefix some hosts put on role names; `ADMIN` and `ROLE_ADMIN` are the same role
pub const ROLE_PREFIX: &str = "ROLE_";

/// Strip the optional `ROLE_` prefix from a role name
pub fn normalize_role(role: &str) -> &str {
    role.strip_prefix(ROLE_PREFIX).unwrap_or(role)
}

/// An authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    name: String,
    #[serde(default)]
    roles: BTreeSet<String>,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: BTreeSet::new(),
        }
    }

    /// Add a granted role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Add several granted roles
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Check if the principal holds a role, ignoring a `ROLE_` prefix on either side
    pub fn has_role(&self, role: &str) -> bool {
        let wanted = normalize_role(role);
        self.roles.iter().any(|r| normalize_role(r) == wanted)
    }

    /// Check if the principal holds at least one of the roles
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The request path and the variables bound by the rule that matched it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorizationContext {
    path: String,
    variables: HashMap<String, String>,
}

impl AuthorizationContext {
    pub fn new(path: impl Into<String>, variables: HashMap<String, String>) -> Self {
        Self {
            path: path.into(),
            variables,
        }
    }

    /// Context for a path no pattern bound anything in
    pub fn unmatched(path: impl Into<String>) -> Self {
        Self::new(path, HashMap::new())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// Result of access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access is allowed
    Allowed,
    /// Access is denied with a reason
    Denied(String),
}

impl AccessDecision {
    /// Build a decision from a boolean outcome
    pub fn from_granted(granted: bool, reason: impl FnOnce() -> String) -> Self {
        if granted {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied(reason())
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Denied(_))
    }

    /// The denial reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            AccessDecision::Allowed => None,
            AccessDecision::Denied(reason) => Some(reason),
        }
    }
}
