//! Authorization evaluator
//!
//! Rules are evaluated in declaration order and the first rule whose pattern
//! matches decides. When no rule matches, the default access applies
//! (`authenticated` unless configured otherwise).

use crate::access_control::rules::{Access, Rule};
use crate::access_control::types::{AccessDecision, AuthorizationContext, Identity};
use crate::config::AuthorizationConfig;
use crate::error::{AccessDeniedError, ConfigError};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Authorization evaluator
///
/// Immutable after construction; share it behind an `Arc` and call
/// [`evaluate`](Self::evaluate) from any number of threads.
#[derive(Debug, Clone)]
pub struct AuthorizationEvaluator {
    rules: Vec<Rule>,
    default_access: Access,
}

/// Outcome of one evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub decision: AccessDecision,
    pub context: AuthorizationContext,
    /// Position of the rule that decided, `None` when the default applied
    pub rule: Option<usize>,
}

/// The rule governing a path
#[derive(Debug)]
pub struct RuleMatch<'a> {
    pub index: usize,
    pub rule: &'a Rule,
    pub context: AuthorizationContext,
}

impl AuthorizationEvaluator {
    /// Create an evaluator from compiled rules
    ///
    /// Fails when two rules have equivalent patterns, since the second could
    /// never match.
    pub fn new(rules: Vec<Rule>, default_access: Access) -> Result<Self, ConfigError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (index, rule) in rules.iter().enumerate() {
            let pattern = rule.pattern().as_str();
            if let Some(&first) = seen.get(rule.pattern().canonical()) {
                return Err(ConfigError::ConflictingRules {
                    pattern: pattern.to_string(),
                    first,
                    second: index,
                });
            }
            seen.insert(rule.pattern().canonical(), index);

            if let Some(variable) = rule.access().variable()
                && !rule.pattern().binds(variable)
            {
                warn!(
                    rule = index,
                    pattern,
                    variable,
                    "Rule reads a path variable its pattern does not bind; it will always deny"
                );
            }
        }

        if let Some(index) = rules.iter().position(|r| r.pattern().is_catch_all())
            && index + 1 < rules.len()
        {
            warn!(
                rule = index,
                pattern = rules[index].pattern().as_str(),
                shadowed = rules.len() - index - 1,
                "Catch-all rule shadows every rule declared after it"
            );
        }

        Ok(Self {
            rules,
            default_access,
        })
    }

    /// Start building an evaluator rule by rule
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    /// Create an evaluator from configuration
    pub fn from_config(config: &AuthorizationConfig) -> Result<Self, ConfigError> {
        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| Rule::new(&rule.pattern, rule.to_access(index)?))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(rules, config.default.into())
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Access applied when no rule matches
    pub fn default_access(&self) -> &Access {
        &self.default_access
    }

    /// Find the first rule whose pattern matches the path
    pub fn matching_rule(&self, path: &str) -> Option<RuleMatch<'_>> {
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            rule.match_path(path).map(|context| RuleMatch {
                index,
                rule,
                context,
            })
        })
    }

    /// Evaluate a request, keeping the matched context and rule position
    pub fn authorize(&self, identity: Option<&Identity>, path: &str) -> Evaluation {
        debug!(
            path,
            principal = identity.map(Identity::name),
            "Evaluating access"
        );

        match self.matching_rule(path) {
            Some(RuleMatch {
                index,
                rule,
                context,
            }) => {
                trace!(rule = index, pattern = rule.pattern().as_str(), access = %rule.access(), "Matched rule");
                Evaluation {
                    decision: rule.access().decide(identity, &context),
                    context,
                    rule: Some(index),
                }
            }
            None => {
                trace!(access = %self.default_access, "No rule matched, using default access");
                let context = AuthorizationContext::unmatched(path);
                Evaluation {
                    decision: self.default_access.decide(identity, &context),
                    context,
                    rule: None,
                }
            }
        }
    }

    /// Decide whether the principal (or anonymous caller) may access the path
    pub fn evaluate(&self, identity: Option<&Identity>, path: &str) -> AccessDecision {
        self.authorize(identity, path).decision
    }

    /// Like [`evaluate`](Self::evaluate), returning an error if denied
    pub fn require(&self, identity: Option<&Identity>, path: &str) -> Result<(), AccessDeniedError> {
        match self.evaluate(identity, path) {
            AccessDecision::Allowed => Ok(()),
            AccessDecision::Denied(reason) => Err(AccessDeniedError::new(path, reason)),
        }
    }

    /// Evaluator that allows every request (for testing)
    pub fn permit_all() -> Self {
        Self {
            rules: Vec::new(),
            default_access: Access::PermitAll,
        }
    }

    /// Evaluator that denies every request
    pub fn deny_all() -> Self {
        Self {
            rules: Vec::new(),
            default_access: Access::DenyAll,
        }
    }
}

/// Fluent construction of an [`AuthorizationEvaluator`]
///
/// ```
/// use pathguard::access_control::AuthorizationEvaluator;
///
/// let evaluator = AuthorizationEvaluator::builder()
///     .path("/admin/**").has_role("ADMIN")
///     .path("/users/{user}/**").path_variable_matches_name("user")
///     .any_request().authenticated()
///     .build()
///     .unwrap();
///
/// assert_eq!(evaluator.rules().len(), 2);
/// ```
#[derive(Debug)]
pub struct EvaluatorBuilder {
    rules: Vec<(String, Access)>,
    default_access: Access,
}

impl Default for EvaluatorBuilder {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_access: Access::Authenticated,
        }
    }
}

impl EvaluatorBuilder {
    /// Start a rule for a path pattern
    pub fn path(self, pattern: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            parent: self,
            pattern: Some(pattern.into()),
        }
    }

    /// Set the access applied when no rule matches
    pub fn any_request(self) -> RuleBuilder {
        RuleBuilder {
            parent: self,
            pattern: None,
        }
    }

    /// Append a rule directly
    pub fn rule(mut self, pattern: impl Into<String>, access: Access) -> Self {
        self.rules.push((pattern.into(), access));
        self
    }

    /// Compile every pattern and build the evaluator
    pub fn build(self) -> Result<AuthorizationEvaluator, ConfigError> {
        let rules = self
            .rules
            .into_iter()
            .map(|(pattern, access)| Rule::new(&pattern, access))
            .collect::<Result<Vec<_>, _>>()?;

        AuthorizationEvaluator::new(rules, self.default_access)
    }
}

/// Pending rule awaiting its access requirement
#[derive(Debug)]
pub struct RuleBuilder {
    parent: EvaluatorBuilder,
    pattern: Option<String>,
}

impl RuleBuilder {
    pub fn access(self, access: Access) -> EvaluatorBuilder {
        let mut parent = self.parent;
        match self.pattern {
            Some(pattern) => parent.rules.push((pattern, access)),
            None => parent.default_access = access,
        }
        parent
    }

    pub fn permit_all(self) -> EvaluatorBuilder {
        self.access(Access::PermitAll)
    }

    pub fn deny_all(self) -> EvaluatorBuilder {
        self.access(Access::DenyAll)
    }

    pub fn authenticated(self) -> EvaluatorBuilder {
        self.access(Access::Authenticated)
    }

    pub fn has_role(self, role: impl Into<String>) -> EvaluatorBuilder {
        self.access(Access::HasRole(role.into()))
    }

    pub fn has_any_role<I, S>(self, roles: I) -> EvaluatorBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access(Access::HasAnyRole(
            roles.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn path_variable_matches_name(self, variable: impl Into<String>) -> EvaluatorBuilder {
        self.access(Access::PathVariableMatchesName(variable.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefaultAccess, RuleConfig};

    fn sample() -> AuthorizationEvaluator {
        AuthorizationEvaluator::builder()
            .path("/admin/**")
            .has_role("ADMIN")
            .path("/users/{user}/**")
            .path_variable_matches_name("user")
            .any_request()
            .authenticated()
            .build()
            .unwrap()
    }

    #[test]
    fn test_permit_all() {
        let evaluator = AuthorizationEvaluator::permit_all();
        assert!(evaluator.evaluate(None, "/admin/panel").is_allowed());
    }

    #[test]
    fn test_deny_all() {
        let evaluator = AuthorizationEvaluator::deny_all();
        let root = Identity::new("root").with_role("ADMIN");
        assert!(evaluator.evaluate(Some(&root), "/anything").is_denied());
    }

    #[test]
    fn test_admin_rule() {
        let evaluator = sample();
        let root = Identity::new("root").with_role("ADMIN");
        let alice = Identity::new("alice");

        assert!(evaluator.evaluate(Some(&root), "/admin/panel").is_allowed());
        assert!(evaluator.evaluate(Some(&alice), "/admin/panel").is_denied());
        assert!(evaluator.evaluate(None, "/admin/panel").is_denied());
    }

    #[test]
    fn test_user_rule() {
        let evaluator = sample();
        let alice = Identity::new("alice");
        let root = Identity::new("root").with_role("ADMIN");

        assert!(evaluator.evaluate(Some(&alice), "/users/alice/settings").is_allowed());
        assert!(evaluator.evaluate(Some(&alice), "/users/bob/settings").is_denied());
        assert!(evaluator.evaluate(Some(&root), "/users/alice/settings").is_denied());
    }

    #[test]
    fn test_default_rule() {
        let evaluator = sample();
        let alice = Identity::new("alice");

        let evaluation = evaluator.authorize(Some(&alice), "/");
        assert!(evaluation.decision.is_allowed());
        assert_eq!(evaluation.rule, None);
        assert!(evaluator.evaluate(None, "/").is_denied());
    }

    #[test]
    fn test_authorize_reports_rule_and_context() {
        let evaluator = sample();
        let alice = Identity::new("alice");

        let evaluation = evaluator.authorize(Some(&alice), "/users/alice/settings");
        assert_eq!(evaluation.rule, Some(1));
        assert_eq!(evaluation.context.variable("user"), Some("alice"));
    }

    #[test]
    fn test_require() {
        let evaluator = sample();
        let alice = Identity::new("alice");

        assert!(evaluator.require(Some(&alice), "/users/alice").is_ok());
        let err = evaluator.require(Some(&alice), "/admin").unwrap_err();
        assert_eq!(err.path, "/admin");
        assert!(err.reason.contains("ADMIN"));
    }

    #[test]
    fn test_duplicate_pattern_is_rejected() {
        let result = AuthorizationEvaluator::builder()
            .path("/admin/**")
            .has_role("ADMIN")
            .path("/admin/**")
            .permit_all()
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::ConflictingRules {
                first: 0,
                second: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_equivalent_pattern_is_rejected() {
        let result = AuthorizationEvaluator::builder()
            .path("/admin/**")
            .has_role("ADMIN")
            .path("/admin/**/")
            .permit_all()
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::ConflictingRules { ref pattern, first: 0, second: 1 })
                if pattern == "/admin/**/"
        ));

        let result = AuthorizationEvaluator::builder()
            .path("/users/{user}/**")
            .path_variable_matches_name("user")
            .path("/users/{name}/**")
            .path_variable_matches_name("name")
            .build();
        assert!(matches!(result, Err(ConfigError::ConflictingRules { .. })));
    }

    #[test]
    fn test_invalid_pattern_fails_build() {
        let result = AuthorizationEvaluator::builder()
            .path("admin/**")
            .has_role("ADMIN")
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_from_config() {
        let config = AuthorizationConfig {
            default: DefaultAccess::PermitAll,
            rules: vec![RuleConfig::has_role("/admin/**", "ADMIN")],
        };
        let evaluator = AuthorizationEvaluator::from_config(&config).unwrap();

        assert_eq!(evaluator.rules().len(), 1);
        assert_eq!(evaluator.default_access(), &Access::PermitAll);
        assert!(evaluator.evaluate(None, "/public").is_allowed());
        assert!(evaluator.evaluate(None, "/admin").is_denied());
    }
}
