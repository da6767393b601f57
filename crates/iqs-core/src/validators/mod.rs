//! Structural validators for rules declared `done`.
//!
//! A validator inspects an integration's manifest and source tree for
//! evidence that a completion claim holds. It receives every rule marked
//! `done`, not only its own, so cross-rule checks are possible.
//!
//! Validators are keyed by rule name through the [`RuleCatalog`]; adding a
//! rule with a check means adding a catalog entry bound to a
//! [`RuleValidator`] implementation.

pub mod config_flow;
pub mod diagnostics;
pub mod discovery;
pub mod entry;
pub mod parallel_updates;
pub mod source;
pub mod strict_typing;

use std::collections::BTreeSet;

use crate::catalog::RuleCatalog;
use crate::config::Config;
use crate::integration::Integration;

/// Documentation for each rule lives at this base URL.
pub const RULE_DOCS_BASE: &str =
    "https://developers.home-assistant.io/docs/core/integration-quality-scale/rules";

/// Structural check bound to one rule.
///
/// Returns one message per problem found; an empty list means the claim
/// holds. Implementations must not mutate global state.
pub trait RuleValidator: Send + Sync {
    fn validate(
        &self,
        config: &Config,
        integration: &Integration,
        rules_done: &BTreeSet<String>,
    ) -> Vec<String>;
}

impl<F> RuleValidator for F
where
    F: Fn(&Config, &Integration, &BTreeSet<String>) -> Vec<String> + Send + Sync,
{
    fn validate(
        &self,
        config: &Config,
        integration: &Integration,
        rules_done: &BTreeSet<String>,
    ) -> Vec<String> {
        self(config, integration, rules_done)
    }
}

/// Failures reported by one rule's validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub rule: String,
    pub errors: Vec<String>,
}

impl RuleFailure {
    /// Messages as reported: each error tagged with the rule, then the
    /// documentation link.
    pub fn messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("[{}] {}", self.rule, e))
            .chain(std::iter::once(rule_docs_message(&self.rule)))
            .collect()
    }
}

pub fn rule_docs_message(rule: &str) -> String {
    format!("Please check the documentation at {RULE_DOCS_BASE}/{rule}/")
}

/// Run the validator of every done rule. Every validator runs; one rule's
/// failure never stops the next.
pub fn run_validators(
    catalog: &RuleCatalog,
    config: &Config,
    integration: &Integration,
    rules_done: &BTreeSet<String>,
) -> Vec<RuleFailure> {
    rules_done
        .iter()
        .filter_map(|rule| {
            let validator = catalog.validator(rule)?;
            let errors = validator.validate(config, integration, rules_done);
            tracing::debug!(
                domain = %integration.domain,
                rule = %rule,
                errors = errors.len(),
                "Ran rule validator"
            );
            (!errors.is_empty()).then(|| RuleFailure {
                rule: rule.clone(),
                errors,
            })
        })
        .collect()
}
