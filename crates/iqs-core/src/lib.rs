//! Integration Quality Scale (IQS) validator
//!
//! Checks each integration's `quality_scale.yaml` against the tiered rule
//! catalog:
//! - whether the file must, may or must not exist (presence policy)
//! - whether the document matches the declaration schema
//! - whether rules claimed `done` hold up structurally
//! - whether the tier claimed in the manifest is fully met

pub mod catalog;
pub mod checker;
pub mod config;
pub mod declaration;
pub mod error;
pub mod exemptions;
pub mod integration;
pub mod obs;
pub mod platform;
pub mod presence;
pub mod report;
pub mod telemetry;
pub mod tiers;
pub mod validators;

pub use catalog::{Rule, RuleCatalog, RuleCatalogBuilder, Tier};
pub use checker::{QualityScaleChecker, CATEGORY};
pub use config::Config;
pub use declaration::{
    classify, entry_status, load_declaration, parse_declaration, validate_schema, ParseError,
    RuleClassification, RuleStatus, SchemaViolation, SchemaViolations, StatusEntry,
    DECLARATION_FILE,
};
pub use error::{CatalogError, QualityScaleError, Result};
pub use exemptions::ExemptionLists;
pub use integration::{load_integrations, Integration, IntegrationError, IntegrationType};
pub use presence::{ForbiddenReason, Presence, PresenceOutcome, PresencePolicy, PresenceViolation};
pub use report::{IntegrationReport, ValidationReport};
pub use telemetry::init_tracing;
pub use tiers::{check_tier_completion, TierShortfall};
pub use validators::{rule_docs_message, run_validators, RuleFailure, RuleValidator};
