//! Access control module
//!
//! Decides whether an identity (or an anonymous caller) may access a request path.
//!
//! ## Access Control Model
//!
//! An [`AuthorizationEvaluator`] holds an ordered list of rules, each a path
//! pattern paired with the [`Access`] it requires:
//!
//! 1. Rules are tried in declaration order
//! 2. The first rule whose pattern matches the path decides
//! 3. If no rule matches, the default access applies (`authenticated`)
//!
//! Reordering rules changes outcomes: a catch-all such as `/**` placed first
//! decides every request on its own.
//!
//! ## Example Configuration
//!
//! ```toml
//! [authorization]
//! default = "authenticated"
//!
//! [[authorization.rules]]
//! pattern = "/admin/**"
//! access = "has_role"
//! role = "ADMIN"
//!
//! [[authorization.rules]]
//! pattern = "/users/{user}/**"
//! access = "path_variable_matches_name"
//! variable = "user"
//! ```

pub mod patterns;
pub mod resolver;
pub mod rules;
pub mod types;

pub use patterns::PathPattern;
pub use resolver::{AuthorizationEvaluator, Evaluation, EvaluatorBuilder, RuleBuilder, RuleMatch};
pub use rules::{Access, Rule};
pub use types::{AccessDecision, AuthorizationContext, Identity, normalize_role};
