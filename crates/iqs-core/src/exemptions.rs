//! Domain exemption lists consulted by the presence policy.
//!
//! Two sets of domains are exempt from the "every core integration needs a
//! quality scale file" mandate:
//!
//! - `no_quality_scale`: platform and core helper domains that can never
//!   carry a quality scale. A file here is an error.
//! - `without_file`: grandfathered integrations that predate the mandate.
//!   Once such an integration adds a file it must leave this list.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QualityScaleError, Result};
use crate::platform::ENTITY_PLATFORMS;

/// Core helper domains that structurally cannot carry a quality scale.
const HELPER_DOMAINS: &[&str] = &[
    "api",
    "application_credentials",
    "auth",
    "automation",
    "blueprint",
    "config",
    "configurator",
    "counter",
    "default_config",
    "device_automation",
    "device_tracker",
    "diagnostics",
    "ffmpeg",
    "file_upload",
    "frontend",
    "hardkernel",
    "hardware",
    "history",
    "homeassistant",
    "homeassistant_alerts",
    "homeassistant_green",
    "homeassistant_hardware",
    "homeassistant_sky_connect",
    "homeassistant_yellow",
    "image_upload",
    "input_boolean",
    "input_button",
    "input_datetime",
    "input_number",
    "input_select",
    "input_text",
    "intent_script",
    "intent",
    "logbook",
    "logger",
    "lovelace",
    "media_source",
    "my",
    "onboarding",
    "panel_custom",
    "proxy",
    "python_script",
    "raspberry_pi",
    "recovery_mode",
    "repairs",
    "schedule",
    "script",
    "search",
    "system_health",
    "system_log",
    "tag",
    "timer",
    "trace",
    "webhook",
    "websocket_api",
    "zone",
];

/// Grandfathered domains shipped with the crate, one per line; `#` starts a
/// comment line.
const WITHOUT_FILE_LIST: &str = include_str!("../data/without_quality_scale_file.txt");

fn listed_domains(list: &str) -> impl Iterator<Item = &str> {
    list.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Exempted domain sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExemptionLists {
    /// Domains forbidden from having a quality scale file.
    #[serde(default)]
    pub no_quality_scale: BTreeSet<String>,

    /// Grandfathered domains allowed to lack a quality scale file.
    #[serde(default)]
    pub without_file: BTreeSet<String>,
}

impl ExemptionLists {
    /// Platforms and helper domains as forbidden, plus the shipped
    /// grandfathered list.
    pub fn builtin() -> Self {
        Self {
            no_quality_scale: ENTITY_PLATFORMS
                .iter()
                .chain(HELPER_DOMAINS)
                .map(|d| d.to_string())
                .collect(),
            without_file: listed_domains(WITHOUT_FILE_LIST)
                .map(str::to_string)
                .collect(),
        }
    }

    /// Load lists from a YAML file of the form
    /// `{ no_quality_scale: [...], without_file: [...] }`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let lists: Self =
            serde_yaml::from_str(&raw).map_err(|e| QualityScaleError::InvalidExemptions {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if let Some(domain) = lists.no_quality_scale.intersection(&lists.without_file).next() {
            return Err(QualityScaleError::InvalidExemptions {
                path: path.to_path_buf(),
                reason: format!("{domain} is listed as both forbidden and grandfathered"),
            });
        }
        Ok(lists)
    }

    /// Union with another set of lists.
    pub fn merge(mut self, other: ExemptionLists) -> Self {
        self.no_quality_scale.extend(other.no_quality_scale);
        self.without_file.extend(other.without_file);
        self
    }

    pub fn is_forbidden(&self, domain: &str) -> bool {
        self.no_quality_scale.contains(domain)
    }

    pub fn is_grandfathered(&self, domain: &str) -> bool {
        self.without_file.contains(domain)
    }
}
