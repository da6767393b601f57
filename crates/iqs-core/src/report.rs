//! Serialisable summary of a validation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::integration::{Integration, IntegrationError};

/// Errors reported for one integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub domain: String,
    pub errors: Vec<IntegrationError>,
}

/// Outcome of a validation run, ordered by domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checked: usize,
    pub integrations: Vec<IntegrationReport>,
}

impl ValidationReport {
    /// Collect every integration that has at least one error.
    pub fn collect(integrations: &BTreeMap<String, Integration>) -> Self {
        Self {
            checked: integrations.len(),
            integrations: integrations
                .values()
                .filter(|i| !i.errors().is_empty())
                .map(|i| IntegrationReport {
                    domain: i.domain.clone(),
                    errors: i.errors().to_vec(),
                })
                .collect(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.integrations.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.integrations.iter().map(|i| i.errors.len()).sum()
    }

    /// Plain-text rendering, one block per failing integration.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for report in &self.integrations {
            out.push_str(&format!("Integration {}:\n", report.domain));
            for error in &report.errors {
                out.push_str(&format!(" * [{}] {}\n", error.category, error.message));
            }
            out.push('\n');
        }
        out
    }
}
