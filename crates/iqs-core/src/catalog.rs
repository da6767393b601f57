//! Rule catalog and tier index.
//!
//! The catalog is an ordered list of named rules, each belonging to exactly
//! one [`Tier`]. The tier index (`required_rules`) is derived once when the
//! catalog is built and never changes afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::validators::{self, RuleValidator};

/// Quality scale tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 4] = [Tier::Bronze, Tier::Silver, Tier::Gold, Tier::Platinum];

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }

    /// Map a manifest `quality_scale` value to a tier.
    ///
    /// Values that are not tiers (`internal`, `legacy`, ...) mean the
    /// integration claims no tier.
    pub fn from_manifest(value: &str) -> Option<Tier> {
        Tier::ALL.into_iter().find(|t| t.name() == value)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::from_manifest(&s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown tier: {s} (expected bronze, silver, gold or platinum)"))
    }
}

/// A single catalog entry.
#[derive(Clone)]
pub struct Rule {
    pub name: String,
    pub tier: Tier,
    pub validator: Option<Arc<dyn RuleValidator>>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Immutable rule catalog with its derived tier index.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
    by_name: BTreeMap<String, usize>,
    tier_index: BTreeMap<Tier, Vec<String>>,
}

impl RuleCatalog {
    pub fn builder() -> RuleCatalogBuilder {
        RuleCatalogBuilder::default()
    }

    /// The canonical quality scale catalog with the built-in validators bound.
    pub fn standard() -> Result<Self, CatalogError> {
        use Tier::*;

        Self::builder()
            // Bronze
            .rule("action-setup", Bronze)
            .rule("appropriate-polling", Bronze)
            .rule("brands", Bronze)
            .rule("common-modules", Bronze)
            .validated_rule("config-flow", Bronze, validators::config_flow::config_flow)
            .rule("config-flow-test-coverage", Bronze)
            .rule("dependency-transparency", Bronze)
            .rule("docs-actions", Bronze)
            .rule("docs-high-level-description", Bronze)
            .rule("docs-installation-instructions", Bronze)
            .rule("docs-removal-instructions", Bronze)
            .rule("entity-event-setup", Bronze)
            .rule("entity-unique-id", Bronze)
            .rule("has-entity-name", Bronze)
            .validated_rule("runtime-data", Bronze, validators::entry::runtime_data)
            .rule("test-before-configure", Bronze)
            .rule("test-before-setup", Bronze)
            .validated_rule(
                "unique-config-entry",
                Bronze,
                validators::entry::unique_config_entry,
            )
            // Silver
            .rule("action-exceptions", Silver)
            .validated_rule(
                "config-entry-unloading",
                Silver,
                validators::entry::config_entry_unloading,
            )
            .rule("docs-configuration-parameters", Silver)
            .rule("docs-installation-parameters", Silver)
            .rule("entity-unavailable", Silver)
            .rule("integration-owner", Silver)
            .rule("log-when-unavailable", Silver)
            .validated_rule(
                "parallel-updates",
                Silver,
                validators::parallel_updates::parallel_updates,
            )
            .validated_rule(
                "reauthentication-flow",
                Silver,
                validators::config_flow::reauthentication_flow,
            )
            .rule("test-coverage", Silver)
            // Gold
            .rule("devices", Gold)
            .validated_rule("diagnostics", Gold, validators::diagnostics::diagnostics)
            .validated_rule("discovery", Gold, validators::discovery::discovery)
            .rule("discovery-update-info", Gold)
            .rule("docs-data-update", Gold)
            .rule("docs-examples", Gold)
            .rule("docs-known-limitations", Gold)
            .rule("docs-supported-devices", Gold)
            .rule("docs-supported-functions", Gold)
            .rule("docs-troubleshooting", Gold)
            .rule("docs-use-cases", Gold)
            .rule("dynamic-devices", Gold)
            .rule("entity-category", Gold)
            .rule("entity-device-class", Gold)
            .rule("entity-disabled-by-default", Gold)
            .rule("entity-translations", Gold)
            .rule("exception-translations", Gold)
            .rule("icon-translations", Gold)
            .validated_rule(
                "reconfiguration-flow",
                Gold,
                validators::config_flow::reconfiguration_flow,
            )
            .rule("repair-issues", Gold)
            .rule("stale-devices", Gold)
            // Platinum
            .rule("async-dependency", Platinum)
            .rule("inject-websession", Platinum)
            .validated_rule(
                "strict-typing",
                Platinum,
                validators::strict_typing::strict_typing,
            )
            .build()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.by_name.get(name).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        self.rule(name).map(|r| r.tier)
    }

    pub fn validator(&self, name: &str) -> Option<&Arc<dyn RuleValidator>> {
        self.rule(name).and_then(|r| r.validator.as_ref())
    }

    /// Rule names first required at exactly `tier`, in catalog order.
    pub fn required_rules(&self, tier: Tier) -> &[String] {
        self.tier_index.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Builder for [`RuleCatalog`].
#[derive(Default)]
pub struct RuleCatalogBuilder {
    rules: Vec<Rule>,
}

impl RuleCatalogBuilder {
    /// Add a rule with no structural validator.
    pub fn rule(mut self, name: impl Into<String>, tier: Tier) -> Self {
        self.rules.push(Rule {
            name: name.into(),
            tier,
            validator: None,
        });
        self
    }

    /// Add a rule bound to a structural validator.
    pub fn validated_rule(
        mut self,
        name: impl Into<String>,
        tier: Tier,
        validator: impl RuleValidator + 'static,
    ) -> Self {
        self.rules.push(Rule {
            name: name.into(),
            tier,
            validator: Some(Arc::new(validator)),
        });
        self
    }

    /// Build the catalog, checking that rule names are unique kebab-case
    /// identifiers. The tier index partitions the rule set by construction.
    pub fn build(self) -> Result<RuleCatalog, CatalogError> {
        let mut by_name = BTreeMap::new();
        let mut tier_index: BTreeMap<Tier, Vec<String>> =
            Tier::ALL.into_iter().map(|t| (t, Vec::new())).collect();

        for (i, rule) in self.rules.iter().enumerate() {
            if !is_kebab_case(&rule.name) {
                return Err(CatalogError::InvalidRuleName(rule.name.clone()));
            }
            if by_name.insert(rule.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateRule(rule.name.clone()));
            }
            tier_index
                .entry(rule.tier)
                .or_default()
                .push(rule.name.clone());
        }

        debug_assert_eq!(
            tier_index.values().map(Vec::len).sum::<usize>(),
            by_name.len()
        );
        debug_assert_eq!(
            tier_index
                .values()
                .flatten()
                .collect::<HashSet<_>>()
                .len(),
            by_name.len()
        );

        Ok(RuleCatalog {
            rules: self.rules,
            by_name,
            tier_index,
        })
    }
}

fn is_kebab_case(name: &str) -> bool {
    !name.is_empty()
        && name.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}
