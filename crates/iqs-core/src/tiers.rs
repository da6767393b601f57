//! Tier completion: every rule of the declared tier and of every tier below
//! it must be met (done or exempt).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{RuleCatalog, Tier};

/// Rules still outstanding for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierShortfall {
    pub tier: Tier,
    /// Sorted lexicographically.
    pub missing: Vec<String>,
}

impl fmt::Display for TierShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quality scale tier {} requires quality scale rules to be met:",
            self.tier
        )?;
        for rule in &self.missing {
            write!(f, "\n  {rule}: todo")?;
        }
        Ok(())
    }
}

/// Report one shortfall per tier, up to and including `declared`, that has
/// rules not in `rules_met`. No declared tier means no requirement.
pub fn check_tier_completion(
    catalog: &RuleCatalog,
    rules_met: &BTreeSet<String>,
    declared: Option<Tier>,
) -> Vec<TierShortfall> {
    let Some(declared) = declared else {
        return Vec::new();
    };

    let mut shortfalls = Vec::new();
    for tier in Tier::ALL {
        if tier > declared {
            break;
        }
        let mut missing: Vec<String> = catalog
            .required_rules(tier)
            .iter()
            .filter(|rule| !rules_met.contains(*rule))
            .cloned()
            .collect();
        if missing.is_empty() {
            continue;
        }
        missing.sort();
        shortfalls.push(TierShortfall { tier, missing });
    }
    shortfalls
}
