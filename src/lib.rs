//! pathguard
//!
//! Ordered path-pattern authorization: given an identity (or none) and a
//! request path, decide allow or deny.
//!
//! ## Features
//!
//! - **First-match-wins rules** pairing a path pattern with the access it requires
//! - **Path variables** such as `/users/{user}/**`, checked against the principal's name
//! - **Role checks** that treat `ADMIN` and `ROLE_ADMIN` alike
//! - **Flexible configuration** via TOML files and environment variables
//! - **axum middleware** for hosts that already authenticate requests
//!
//! ## Access Control Model
//!
//! ```text
//! rule 1 → rule 2 → ... → default (authenticated)
//! ```
//!
//! The first rule whose pattern matches decides; the rest are never consulted.
//!
//! ## Example
//!
//! ```
//! use pathguard::access_control::{AuthorizationEvaluator, Identity};
//!
//! let evaluator = AuthorizationEvaluator::builder()
//!     .path("/admin/**").has_role("ADMIN")
//!     .path("/users/{user}/**").path_variable_matches_name("user")
//!     .any_request().authenticated()
//!     .build()
//!     .unwrap();
//!
//! let alice = Identity::new("alice");
//! assert!(evaluator.evaluate(Some(&alice), "/users/alice/settings").is_allowed());
//! assert!(evaluator.evaluate(Some(&alice), "/users/bob/settings").is_denied());
//! assert!(evaluator.evaluate(None, "/").is_denied());
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;

// Re-export main types
pub use access_control::{AccessDecision, AuthorizationEvaluator, Identity};
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
