//! Integration model and registry loading.
//!
//! An integration is a directory under the components tree carrying a
//! `manifest.json`. Only the manifest fields the quality scale checks read
//! are typed; the raw manifest stays available to validators.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Tier;
use crate::config::Config;
use crate::error::{QualityScaleError, Result};

/// Declared integration type from the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationType {
    Device,
    Entity,
    Hardware,
    Helper,
    #[default]
    Hub,
    Service,
    System,
    /// Points at another integration; has no code of its own.
    Virtual,
    #[serde(other)]
    Other,
}

/// One error reported against an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationError {
    pub category: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestFields {
    domain: Option<String>,
    #[serde(default)]
    integration_type: IntegrationType,
    quality_scale: Option<String>,
}

/// An integration under validation.
#[derive(Debug, Clone)]
pub struct Integration {
    pub domain: String,
    pub path: PathBuf,
    /// First-party integration shipped with core.
    pub core: bool,
    pub integration_type: IntegrationType,
    pub quality_scale: Option<String>,
    pub manifest: Value,
    errors: Vec<IntegrationError>,
}

impl Integration {
    /// Build an integration in memory.
    pub fn new(domain: impl Into<String>, path: impl Into<PathBuf>, core: bool) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
            core,
            integration_type: IntegrationType::default(),
            quality_scale: None,
            manifest: Value::Object(Default::default()),
            errors: Vec::new(),
        }
    }

    pub fn with_type(mut self, integration_type: IntegrationType) -> Self {
        self.integration_type = integration_type;
        self
    }

    pub fn with_quality_scale(mut self, quality_scale: impl Into<String>) -> Self {
        self.quality_scale = Some(quality_scale.into());
        self
    }

    pub fn with_manifest(mut self, manifest: Value) -> Self {
        self.manifest = manifest;
        self
    }

    /// Load an integration from its directory.
    ///
    /// A missing or malformed manifest does not fail the load: the
    /// integration is named after its directory and carries a `manifest`
    /// error, so the rest of the run can proceed.
    pub fn load(path: &Path, core: bool) -> Self {
        let dir_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut integration = Self::new(dir_name, path, core);

        let manifest_path = path.join("manifest.json");
        let raw = match fs::read_to_string(&manifest_path) {
            Ok(raw) => raw,
            Err(e) => {
                integration.add_error("manifest", format!("Manifest file not readable: {e}"));
                return integration;
            }
        };
        let manifest: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                integration.add_error("manifest", format!("Manifest contains invalid JSON: {e}"));
                return integration;
            }
        };
        match serde_json::from_value::<ManifestFields>(manifest.clone()) {
            Ok(fields) => {
                if let Some(domain) = fields.domain {
                    integration.domain = domain;
                }
                integration.integration_type = fields.integration_type;
                integration.quality_scale = fields.quality_scale;
            }
            Err(e) => {
                integration.add_error("manifest", format!("Invalid manifest: {e}"));
            }
        }
        integration.manifest = manifest;
        integration
    }

    /// Tier claimed by the manifest, if any.
    pub fn declared_tier(&self) -> Option<Tier> {
        self.quality_scale.as_deref().and_then(Tier::from_manifest)
    }

    /// Boolean manifest flag; absent or non-boolean reads as `false`.
    pub fn manifest_flag(&self, key: &str) -> bool {
        self.manifest.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn add_error(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.errors.push(IntegrationError {
            category: category.into(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[IntegrationError] {
        &self.errors
    }

    /// Errors in a single category, in report order.
    pub fn errors_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.category == category)
            .map(|e| e.message.as_str())
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

/// Load every integration under `components_dir`, keyed by domain.
///
/// Honors [`Config::specific_integrations`] when set.
pub fn load_integrations(
    components_dir: &Path,
    core: bool,
    config: &Config,
) -> Result<BTreeMap<String, Integration>> {
    if !components_dir.is_dir() {
        return Err(QualityScaleError::ComponentsDirNotFound(
            components_dir.to_path_buf(),
        ));
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(components_dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .filter(|p| p.file_name().is_some_and(|n| n != "__pycache__"))
        .collect();
    entries.sort();

    let mut integrations = BTreeMap::new();
    for path in entries {
        if !config.includes(&path) {
            continue;
        }
        if !path.join("manifest.json").exists() {
            warn!(path = %path.display(), "Skipping directory without manifest.json");
            continue;
        }
        let integration = Integration::load(&path, core);
        debug!(domain = %integration.domain, "Loaded integration");
        integrations.insert(integration.domain.clone(), integration);
    }
    Ok(integrations)
}
