//! Structured log events for a validation run.
//!
//! Every event carries an `event` field so log pipelines can filter on it.

use tracing::{debug, info, warn};

use crate::presence::PresenceViolation;

/// RAII guard entering an integration-scoped span.
///
/// ```ignore
/// let _span = IntegrationSpan::enter("hue");
/// // events logged here carry domain = "hue"
/// ```
pub struct IntegrationSpan {
    _span: tracing::span::EnteredSpan,
}

impl IntegrationSpan {
    pub fn enter(domain: &str) -> Self {
        let span = tracing::info_span!("iqs.integration", domain = %domain);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_validation_started(integrations: usize) {
    info!(event = "validation.started", integrations = integrations);
}

pub fn emit_presence_violation(domain: &str, violation: &PresenceViolation) {
    warn!(event = "presence.violation", domain = %domain, violation = ?violation);
}

pub fn emit_parse_failed(domain: &str, error: &dyn std::fmt::Display) {
    warn!(event = "declaration.parse_failed", domain = %domain, error = %error);
}

pub fn emit_rule_failed(domain: &str, rule: &str, errors: usize) {
    warn!(event = "rule.failed", domain = %domain, rule = %rule, errors = errors);
}

pub fn emit_integration_checked(domain: &str, errors: usize) {
    debug!(event = "integration.checked", domain = %domain, errors = errors);
}

pub fn emit_validation_finished(integrations: usize, failing: usize) {
    info!(
        event = "validation.finished",
        integrations = integrations,
        failing = failing
    );
}
