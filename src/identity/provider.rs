//! Identity provider trait

use crate::access_control::Identity;

/// Identity provider trait
///
/// Implementations look up the roles granted to a principal. Lookups are
/// synchronous and must be safe to call from many requests at once.
pub trait IdentityProvider: Send + Sync {
    /// Find the identity registered under a name
    fn find(&self, name: &str) -> Option<Identity>;

    /// Get a description of the provider (for logging)
    fn provider_type(&self) -> &'static str;
}

/// Box type alias for identity providers
pub type BoxedIdentityProvider = Box<dyn IdentityProvider>;
