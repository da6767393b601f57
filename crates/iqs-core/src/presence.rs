//! Presence policy: must, may or must not an integration carry a
//! `quality_scale.yaml`?
//!
//! Every violation ends processing of the integration; nothing further is
//! checked once one is reported.

use serde::{Deserialize, Serialize};

use crate::catalog::Tier;
use crate::exemptions::ExemptionLists;
use crate::integration::{Integration, IntegrationType};

/// Why an integration may not carry a declaration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// Virtual integrations have no code of their own.
    Virtual,
    /// Domain is on the no-quality-scale list.
    Domain,
}

/// Applicability of the quality scale file to one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Not a core integration; not checked at all.
    NotApplicable,
    Forbidden(ForbiddenReason),
    /// Predates the mandate; allowed to lack a file.
    Grandfathered,
    Required,
}

/// Presence rule violation. The `Display` text is the reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PresenceViolation {
    #[error("Quality scale definition not found. New integrations are required to at least reach the Bronze tier.")]
    MissingRequired,

    #[error("Quality scale definition not found. Integrations that set a manifest quality scale must have a quality scale definition.")]
    MissingForDeclaredTier,

    #[error("Virtual integrations are not allowed to have a quality scale file.")]
    VirtualHasFile,

    #[error("This integration is not supposed to have a quality scale file.")]
    ForbiddenHasFile,

    #[error("Quality scale file found! Please remove the integration from the grandfathered exemption list.")]
    GrandfatheredHasFile,
}

/// What to do next for one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceOutcome {
    Skip,
    Validate,
    Violation(PresenceViolation),
}

impl Presence {
    /// Decide the outcome given whether the file exists and which tier the
    /// manifest claims.
    pub fn check(self, has_file: bool, declared_tier: Option<Tier>) -> PresenceOutcome {
        match (self, has_file) {
            (Presence::NotApplicable, _) => PresenceOutcome::Skip,
            (Presence::Required, true) => PresenceOutcome::Validate,
            (Presence::Required, false) => {
                PresenceOutcome::Violation(PresenceViolation::MissingRequired)
            }
            (Presence::Forbidden(ForbiddenReason::Virtual), true) => {
                PresenceOutcome::Violation(PresenceViolation::VirtualHasFile)
            }
            (Presence::Forbidden(ForbiddenReason::Domain), true) => {
                PresenceOutcome::Violation(PresenceViolation::ForbiddenHasFile)
            }
            (Presence::Grandfathered, true) => {
                PresenceOutcome::Violation(PresenceViolation::GrandfatheredHasFile)
            }
            (Presence::Forbidden(_) | Presence::Grandfathered, false) => match declared_tier {
                Some(_) => PresenceOutcome::Violation(PresenceViolation::MissingForDeclaredTier),
                None => PresenceOutcome::Skip,
            },
        }
    }
}

/// Presence policy over a set of exemption lists.
#[derive(Debug, Clone)]
pub struct PresencePolicy<'a> {
    exemptions: &'a ExemptionLists,
}

impl<'a> PresencePolicy<'a> {
    pub fn new(exemptions: &'a ExemptionLists) -> Self {
        Self { exemptions }
    }

    /// Classify an integration. Precedence: non-core, virtual, forbidden
    /// domain, grandfathered domain, required.
    pub fn classify(&self, integration: &Integration) -> Presence {
        if !integration.core {
            Presence::NotApplicable
        } else if integration.integration_type == IntegrationType::Virtual {
            Presence::Forbidden(ForbiddenReason::Virtual)
        } else if self.exemptions.is_forbidden(&integration.domain) {
            Presence::Forbidden(ForbiddenReason::Domain)
        } else if self.exemptions.is_grandfathered(&integration.domain) {
            Presence::Grandfathered
        } else {
            Presence::Required
        }
    }

    pub fn decide(&self, integration: &Integration, has_file: bool) -> PresenceOutcome {
        self.classify(integration)
            .check(has_file, integration.declared_tier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists() -> ExemptionLists {
        let mut lists = ExemptionLists::default();
        lists.no_quality_scale.insert("zone".to_string());
        lists.without_file.insert("abode".to_string());
        lists
    }

    fn core(domain: &str) -> Integration {
        Integration::new(domain, format!("/components/{domain}"), true)
    }

    #[test]
    fn test_classify_precedence() {
        let lists = lists();
        let policy = PresencePolicy::new(&lists);

        let custom = Integration::new("hue", "/custom/hue", false);
        assert_eq!(policy.classify(&custom), Presence::NotApplicable);

        let virtual_zone = core("zone").with_type(IntegrationType::Virtual);
        assert_eq!(
            policy.classify(&virtual_zone),
            Presence::Forbidden(ForbiddenReason::Virtual)
        );

        assert_eq!(
            policy.classify(&core("zone")),
            Presence::Forbidden(ForbiddenReason::Domain)
        );
        assert_eq!(policy.classify(&core("abode")), Presence::Grandfathered);
        assert_eq!(policy.classify(&core("hue")), Presence::Required);
    }

    #[test]
    fn test_not_applicable_always_skips() {
        for has_file in [true, false] {
            for tier in [None, Some(Tier::Gold)] {
                assert_eq!(
                    Presence::NotApplicable.check(has_file, tier),
                    PresenceOutcome::Skip
                );
            }
        }
    }

    #[test]
    fn test_required_decision_table() {
        assert_eq!(
            Presence::Required.check(true, None),
            PresenceOutcome::Validate
        );
        assert_eq!(
            Presence::Required.check(false, Some(Tier::Bronze)),
            PresenceOutcome::Violation(PresenceViolation::MissingRequired)
        );
    }

    #[test]
    fn test_file_present_when_exempt() {
        assert_eq!(
            Presence::Forbidden(ForbiddenReason::Virtual).check(true, None),
            PresenceOutcome::Violation(PresenceViolation::VirtualHasFile)
        );
        assert_eq!(
            Presence::Forbidden(ForbiddenReason::Domain).check(true, None),
            PresenceOutcome::Violation(PresenceViolation::ForbiddenHasFile)
        );
        assert_eq!(
            Presence::Grandfathered.check(true, None),
            PresenceOutcome::Violation(PresenceViolation::GrandfatheredHasFile)
        );
    }

    #[test]
    fn test_declared_tier_without_file() {
        for presence in [
            Presence::Forbidden(ForbiddenReason::Virtual),
            Presence::Forbidden(ForbiddenReason::Domain),
            Presence::Grandfathered,
        ] {
            assert_eq!(presence.check(false, None), PresenceOutcome::Skip);
            assert_eq!(
                presence.check(false, Some(Tier::Silver)),
                PresenceOutcome::Violation(PresenceViolation::MissingForDeclaredTier)
            );
        }
    }

    #[test]
    fn test_violation_messages() {
        assert!(PresenceViolation::MissingRequired
            .to_string()
            .ends_with("required to at least reach the Bronze tier."));
        assert!(PresenceViolation::ForbiddenHasFile
            .to_string()
            .contains("not supposed to have a quality scale file."));
    }

    #[test]
    fn test_decide_uses_manifest_tier() {
        let lists = lists();
        let policy = PresencePolicy::new(&lists);
        let grandfathered = core("abode").with_quality_scale("gold");
        assert_eq!(
            policy.decide(&grandfathered, false),
            PresenceOutcome::Violation(PresenceViolation::MissingForDeclaredTier)
        );
        let internal = core("abode").with_quality_scale("internal");
        assert_eq!(policy.decide(&internal, false), PresenceOutcome::Skip);
    }
}
