//! Configuration types for pathguard
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::access_control::Access;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Authorization rules
    pub authorization: AuthorizationConfig,

    /// Known identities
    pub users: Vec<UserConfig>,
}

/// Authorization configuration
///
/// Rules are evaluated in the order they are declared; the first matching
/// pattern decides. `default` applies when no rule matches.
///
/// When `rules` is absent, the built-in rule set is used: `/admin/**`
/// requires the `ADMIN` role and `/users/{user}/**` is reserved for the user
/// it names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Access applied when no rule matches
    pub default: DefaultAccess,

    /// Ordered rules
    pub rules: Vec<RuleConfig>,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            default: DefaultAccess::Authenticated,
            rules: vec![
                RuleConfig::has_role("/admin/**", "ADMIN"),
                RuleConfig::path_variable_matches_name("/users/{user}/**", "user"),
            ],
        }
    }
}

/// Access applied to requests no rule matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAccess {
    PermitAll,
    DenyAll,
    #[default]
    Authenticated,
}

impl From<DefaultAccess> for Access {
    fn from(access: DefaultAccess) -> Self {
        match access {
            DefaultAccess::PermitAll => Access::PermitAll,
            DefaultAccess::DenyAll => Access::DenyAll,
            DefaultAccess::Authenticated => Access::Authenticated,
        }
    }
}

/// Kind of access a rule requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    PermitAll,
    DenyAll,
    #[default]
    Authenticated,
    /// Requires `role`
    HasRole,
    /// Requires `roles`
    HasAnyRole,
    /// Requires `variable`
    PathVariableMatchesName,
}

/// A single rule as written in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Path pattern, e.g. `/users/{user}/**`
    pub pattern: String,

    /// Required access
    pub access: AccessKind,

    /// Role for `has_role`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Roles for `has_any_role`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Path variable for `path_variable_matches_name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
}

impl RuleConfig {
    pub fn new(pattern: impl Into<String>, access: AccessKind) -> Self {
        Self {
            pattern: pattern.into(),
            access,
            ..Default::default()
        }
    }

    pub fn has_role(pattern: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::new(pattern, AccessKind::HasRole)
        }
    }

    pub fn path_variable_matches_name(
        pattern: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self {
            variable: Some(variable.into()),
            ..Self::new(pattern, AccessKind::PathVariableMatchesName)
        }
    }

    /// Resolve the access this rule requires
    ///
    /// `position` is the rule's index, used to name the offending field.
    pub fn to_access(&self, position: usize) -> Result<Access, ConfigError> {
        let field = |name: &str| format!("authorization.rules[{}].{}", position, name);

        match self.access {
            AccessKind::PermitAll => Ok(Access::PermitAll),
            AccessKind::DenyAll => Ok(Access::DenyAll),
            AccessKind::Authenticated => Ok(Access::Authenticated),
            AccessKind::HasRole => match self.role.as_deref().map(str::trim) {
                Some(role) if !role.is_empty() => Ok(Access::HasRole(role.to_string())),
                _ => Err(ConfigError::Missing {
                    field: field("role"),
                }),
            },
            AccessKind::HasAnyRole => {
                let roles: Vec<String> = self
                    .roles
                    .iter()
                    .chain(self.role.iter())
                    .map(|r| r.trim())
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect();
                if roles.is_empty() {
                    return Err(ConfigError::Missing {
                        field: field("roles"),
                    });
                }
                Ok(Access::HasAnyRole(roles))
            }
            AccessKind::PathVariableMatchesName => match self.variable.as_deref().map(str::trim) {
                Some(variable) if !variable.is_empty() => {
                    Ok(Access::PathVariableMatchesName(variable.to_string()))
                }
                _ => Err(ConfigError::Missing {
                    field: field("variable"),
                }),
            },
        }
    }
}

/// A known identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserConfig {
    /// Principal name
    pub name: String,

    /// Granted roles
    pub roles: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.authorization.default, DefaultAccess::Authenticated);
        assert_eq!(config.authorization.rules.len(), 2);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_deserialize_access_kind() {
        let kind: AccessKind = serde_json::from_str(r#""has_role""#).unwrap();
        assert_eq!(kind, AccessKind::HasRole);

        let kind: AccessKind = serde_json::from_str(r#""path_variable_matches_name""#).unwrap();
        assert_eq!(kind, AccessKind::PathVariableMatchesName);

        let kind: DefaultAccess = serde_json::from_str(r#""deny_all""#).unwrap();
        assert_eq!(kind, DefaultAccess::DenyAll);

        assert!(serde_json::from_str::<DefaultAccess>(r#""has_role""#).is_err());
    }

    #[test]
    fn test_to_access() {
        let rule = RuleConfig::has_role("/admin/**", "ADMIN");
        assert_eq!(rule.to_access(0).unwrap(), Access::HasRole("ADMIN".into()));

        let rule = RuleConfig {
            roles: vec!["OPS".into()],
            role: Some("ADMIN".into()),
            ..RuleConfig::new("/ops/**", AccessKind::HasAnyRole)
        };
        assert_eq!(
            rule.to_access(0).unwrap(),
            Access::HasAnyRole(vec!["OPS".into(), "ADMIN".into()])
        );
    }

    #[test]
    fn test_to_access_missing_argument() {
        let rule = RuleConfig::new("/admin/**", AccessKind::HasRole);
        let err = rule.to_access(3).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing { ref field } if field == "authorization.rules[3].role"
        ));

        let rule = RuleConfig {
            variable: Some("  ".into()),
            ..RuleConfig::new("/users/{user}", AccessKind::PathVariableMatchesName)
        };
        assert!(rule.to_access(0).is_err());

        let rule = RuleConfig::new("/ops/**", AccessKind::HasAnyRole);
        assert!(rule.to_access(0).is_err());
    }
}
