//! Project-wide configuration handed to validators.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Components live under `<root>/homeassistant/components`.
const COMPONENTS_DIR: &str = "homeassistant/components";

/// Strict typing allow-list at the project root.
const STRICT_TYPING_FILE: &str = ".strict-typing";

/// Project-wide settings.
///
/// The dispatch core never reads this; it is passed through untouched to
/// every [`RuleValidator`](crate::validators::RuleValidator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Repository root.
    pub root: PathBuf,

    /// Restrict the run to these integration domains (or directories).
    pub specific_integrations: Option<Vec<String>>,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            specific_integrations: None,
        }
    }

    /// Restrict the run to the given integrations. An empty list means all.
    pub fn with_specific_integrations(mut self, integrations: Vec<String>) -> Self {
        self.specific_integrations = if integrations.is_empty() {
            None
        } else {
            Some(integrations)
        };
        self
    }

    pub fn components_dir(&self) -> PathBuf {
        self.root.join(COMPONENTS_DIR)
    }

    pub fn strict_typing_path(&self) -> PathBuf {
        self.root.join(STRICT_TYPING_FILE)
    }

    /// Whether an integration directory is part of this run.
    pub fn includes(&self, integration_dir: &Path) -> bool {
        let Some(wanted) = &self.specific_integrations else {
            return true;
        };
        let dir_name = integration_dir
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        wanted.iter().any(|w| {
            let w = w.trim_end_matches('/');
            w == dir_name || Path::new(w) == integration_dir
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_root() {
        let config = Config::new("/repo");
        assert_eq!(
            config.components_dir(),
            PathBuf::from("/repo/homeassistant/components")
        );
        assert_eq!(config.strict_typing_path(), PathBuf::from("/repo/.strict-typing"));
    }

    #[test]
    fn test_includes_everything_by_default() {
        let config = Config::new("/repo");
        assert!(config.includes(Path::new("/repo/homeassistant/components/hue")));
    }

    #[test]
    fn test_includes_by_domain_or_path() {
        let config = Config::new("/repo").with_specific_integrations(vec![
            "hue".to_string(),
            "/repo/homeassistant/components/zha/".to_string(),
        ]);
        assert!(config.includes(Path::new("/repo/homeassistant/components/hue")));
        assert!(config.includes(Path::new("/repo/homeassistant/components/zha")));
        assert!(!config.includes(Path::new("/repo/homeassistant/components/deconz")));
    }

    #[test]
    fn test_empty_specific_list_means_all() {
        let config = Config::new("/repo").with_specific_integrations(vec![]);
        assert!(config.specific_integrations.is_none());
    }
}
