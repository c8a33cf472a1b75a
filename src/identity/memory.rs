//! In-memory identity store
//!
//! Built once from the `[[users]]` configuration entries.

use crate::access_control::Identity;
use crate::config::UserConfig;
use crate::error::ConfigError;
use crate::identity::provider::IdentityProvider;
use std::collections::HashMap;

/// Identity provider backed by a fixed map of users
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    users: HashMap<String, Identity>,
}

impl InMemoryIdentityProvider {
    /// Create a provider from identities, rejecting duplicate or empty names
    pub fn new(identities: impl IntoIterator<Item = Identity>) -> Result<Self, ConfigError> {
        let mut users = HashMap::new();

        for identity in identities {
            if identity.name().trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: "user name must not be empty".to_string(),
                });
            }
            if users.contains_key(identity.name()) {
                return Err(ConfigError::Invalid {
                    message: format!("user '{}' is declared more than once", identity.name()),
                });
            }
            users.insert(identity.name().to_string(), identity);
        }

        Ok(Self { users })
    }

    /// Create a provider from configuration entries
    pub fn from_config(users: &[UserConfig]) -> Result<Self, ConfigError> {
        Self::new(
            users
                .iter()
                .map(|u| Identity::new(u.name.clone()).with_roles(u.roles.iter().cloned())),
        )
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn find(&self, name: &str) -> Option<Identity> {
        self.users.get(name).cloned()
    }

    fn provider_type(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, roles: &[&str]) -> UserConfig {
        UserConfig {
            name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_find() {
        let provider =
            InMemoryIdentityProvider::from_config(&[user("root", &["ADMIN"]), user("alice", &[])])
                .unwrap();

        assert_eq!(provider.len(), 2);
        let root = provider.find("root").unwrap();
        assert!(root.has_role("ADMIN"));
        assert!(provider.find("alice").unwrap().roles().is_empty());
        assert!(provider.find("mallory").is_none());
    }

    #[test]
    fn test_names_are_exact() {
        let provider = InMemoryIdentityProvider::from_config(&[user("alice", &[])]).unwrap();
        assert!(provider.find("Alice").is_none());
    }

    #[test]
    fn test_duplicate_user() {
        let result =
            InMemoryIdentityProvider::from_config(&[user("alice", &[]), user("alice", &["ADMIN"])]);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_empty_name() {
        let result = InMemoryIdentityProvider::from_config(&[user(" ", &[])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_store() {
        let provider = InMemoryIdentityProvider::default();
        assert!(provider.is_empty());
        assert_eq!(provider.provider_type(), "in-memory");
    }
}
