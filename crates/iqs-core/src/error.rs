//! Error taxonomy for the quality scale validator.
//!
//! Problems found *in* an integration are never returned as errors; they are
//! appended to the integration's error sink. The types here cover failures
//! of the validator's own inputs: catalog construction, exemption list
//! loading and directory scanning.

use std::path::PathBuf;

/// Catalog construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate rule in catalog: {0}")]
    DuplicateRule(String),

    #[error("rule name is not kebab-case: {0:?}")]
    InvalidRuleName(String),
}

/// Quality scale validator errors.
#[derive(Debug, thiserror::Error)]
pub enum QualityScaleError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("components directory not found: {0}")]
    ComponentsDirNotFound(PathBuf),

    #[error("invalid exemption list {path}: {reason}")]
    InvalidExemptions { path: PathBuf, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for quality scale operations.
pub type Result<T> = std::result::Result<T, QualityScaleError>;
