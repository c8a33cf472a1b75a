//! Identity module
//!
//! Resolves principal names to [`Identity`] values. Credentials are the
//! host's concern; a provider only knows which roles a name carries.

pub mod memory;
pub mod provider;

pub use memory::InMemoryIdentityProvider;
pub use provider::{BoxedIdentityProvider, IdentityProvider};

pub use crate::access_control::Identity;

use crate::config::AppConfig;
use crate::error::ConfigError;

/// Create an identity provider from configuration
pub fn create_identity_provider(config: &AppConfig) -> Result<BoxedIdentityProvider, ConfigError> {
    Ok(Box::new(InMemoryIdentityProvider::from_config(&config.users)?))
}
