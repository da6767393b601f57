//! Per-integration validation pipeline.
//!
//! Presence policy -> parse -> schema -> classification -> structural
//! validators (done rules) -> tier completion (met rules).
//!
//! A presence violation or parse failure ends processing of that
//! integration. Once the document is parsed, schema errors, validator
//! errors and tier shortfalls are independent and all reported.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::RuleCatalog;
use crate::config::Config;
use crate::declaration::{self, DECLARATION_FILE};
use crate::error::Result;
use crate::exemptions::ExemptionLists;
use crate::integration::Integration;
use crate::obs;
use crate::presence::{PresenceOutcome, PresencePolicy};
use crate::tiers::check_tier_completion;
use crate::validators::run_validators;

/// Error category for everything this checker reports.
pub const CATEGORY: &str = "quality_scale";

/// Quality scale checker over an immutable catalog and exemption lists.
#[derive(Debug, Clone)]
pub struct QualityScaleChecker {
    catalog: RuleCatalog,
    exemptions: ExemptionLists,
}

impl QualityScaleChecker {
    pub fn new(catalog: RuleCatalog, exemptions: ExemptionLists) -> Self {
        Self {
            catalog,
            exemptions,
        }
    }

    /// Standard catalog with built-in exemption lists.
    pub fn standard() -> Result<Self> {
        Ok(Self::new(RuleCatalog::standard()?, ExemptionLists::builtin()))
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn exemptions(&self) -> &ExemptionLists {
        &self.exemptions
    }

    /// Validate every integration in the registry.
    pub fn validate(&self, config: &Config, integrations: &mut BTreeMap<String, Integration>) {
        obs::emit_validation_started(integrations.len());
        for integration in integrations.values_mut() {
            self.validate_integration(config, integration);
        }
        let failing = integrations
            .values()
            .filter(|i| i.errors_in(CATEGORY).next().is_some())
            .count();
        obs::emit_validation_finished(integrations.len(), failing);
    }

    /// Validate one integration, appending findings to its error sink.
    pub fn validate_integration(&self, config: &Config, integration: &mut Integration) {
        let _span = obs::IntegrationSpan::enter(&integration.domain);

        let declaration_path = integration.path.join(DECLARATION_FILE);
        let has_file = declaration_path.is_file();

        match PresencePolicy::new(&self.exemptions).decide(integration, has_file) {
            PresenceOutcome::Skip => {
                debug!(domain = %integration.domain, has_file, "Quality scale not checked");
                return;
            }
            PresenceOutcome::Violation(violation) => {
                obs::emit_presence_violation(&integration.domain, &violation);
                integration.add_error(CATEGORY, violation.to_string());
                return;
            }
            PresenceOutcome::Validate => {}
        }

        let doc = match declaration::load_declaration(&declaration_path) {
            Ok(doc) => doc,
            Err(e) => {
                obs::emit_parse_failed(&integration.domain, &e);
                integration.add_error(CATEGORY, format!("Invalid {DECLARATION_FILE}"));
                return;
            }
        };

        if let Err(violations) = declaration::validate_schema(&doc, &self.catalog) {
            integration.add_error(
                CATEGORY,
                format!("Invalid {}: {}", declaration_path.display(), violations),
            );
        }

        let rules = declaration::classify(&doc);

        for failure in run_validators(&self.catalog, config, integration, &rules.done) {
            obs::emit_rule_failed(&integration.domain, &failure.rule, failure.errors.len());
            for message in failure.messages() {
                integration.add_error(CATEGORY, message);
            }
        }

        for shortfall in
            check_tier_completion(&self.catalog, &rules.met, integration.declared_tier())
        {
            integration.add_error(CATEGORY, shortfall.to_string());
        }

        obs::emit_integration_checked(
            &integration.domain,
            integration.errors_in(CATEGORY).count(),
        );
    }
}
