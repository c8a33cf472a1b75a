//! Authorization rules
//!
//! A rule pairs a [`PathPattern`] with the [`Access`] required once the
//! pattern matches.

use crate::access_control::patterns::PathPattern;
use crate::access_control::types::{AccessDecision, AuthorizationContext, Identity};
use crate::error::ConfigError;
use std::fmt;

/// Access required by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Anyone, authenticated or not
    PermitAll,
    /// No one
    DenyAll,
    /// Any authenticated principal
    Authenticated,
    /// An authenticated principal holding the role
    HasRole(String),
    /// An authenticated principal holding at least one of the roles
    HasAnyRole(Vec<String>),
    /// An authenticated principal whose name equals the named path variable
    PathVariableMatchesName(String),
}

impl Access {
    /// Decide for a principal (or none) against the matched context
    pub fn decide(
        &self,
        identity: Option<&Identity>,
        context: &AuthorizationContext,
    ) -> AccessDecision {
        match self {
            Access::PermitAll => AccessDecision::Allowed,
            Access::DenyAll => AccessDecision::Denied("access is denied to everyone".to_string()),
            Access::Authenticated => match identity {
                Some(_) => AccessDecision::Allowed,
                None => unauthenticated(),
            },
            Access::HasRole(role) => match identity {
                Some(identity) => AccessDecision::from_granted(identity.has_role(role), || {
                    format!("role '{}' is required", role)
                }),
                None => unauthenticated(),
            },
            Access::HasAnyRole(roles) => match identity {
                Some(identity) => AccessDecision::from_granted(identity.has_any_role(roles), || {
                    format!("one of the roles [{}] is required", roles.join(", "))
                }),
                None => unauthenticated(),
            },
            Access::PathVariableMatchesName(variable) => {
                let Some(identity) = identity else {
                    return unauthenticated();
                };
                match context.variable(variable) {
                    Some(value) => AccessDecision::from_granted(value == identity.name(), || {
                        format!(
                            "path variable '{}' does not match principal '{}'",
                            variable,
                            identity.name()
                        )
                    }),
                    None => AccessDecision::Denied(format!(
                        "path variable '{}' is not bound by the matched pattern",
                        variable
                    )),
                }
            }
        }
    }

    /// Whether this access can only be granted to an authenticated principal
    pub fn requires_identity(&self) -> bool {
        !matches!(self, Access::PermitAll | Access::DenyAll)
    }

    /// The path variable this access reads, if any
    pub fn variable(&self) -> Option<&str> {
        match self {
            Access::PathVariableMatchesName(variable) => Some(variable),
            _ => None,
        }
    }
}

fn unauthenticated() -> AccessDecision {
    AccessDecision::Denied("authentication is required".to_string())
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::PermitAll => f.write_str("permit_all"),
            Access::DenyAll => f.write_str("deny_all"),
            Access::Authenticated => f.write_str("authenticated"),
            Access::HasRole(role) => write!(f, "has_role({})", role),
            Access::HasAnyRole(roles) => write!(f, "has_any_role({})", roles.join(", ")),
            Access::PathVariableMatchesName(variable) => {
                write!(f, "path_variable_matches_name({})", variable)
            }
        }
    }
}

/// A path pattern and the access it requires
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: PathPattern,
    access: Access,
}

impl Rule {
    /// Compile a rule from a pattern string
    pub fn new(pattern: &str, access: Access) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            access,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    /// Match a request path, returning its context on success
    pub fn match_path(&self, path: &str) -> Option<AuthorizationContext> {
        self.pattern
            .match_path(path)
            .map(|variables| AuthorizationContext::new(path, variables))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.pattern, self.access)
    }
}
