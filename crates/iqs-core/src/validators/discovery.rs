//! `discovery` rule.

use std::collections::BTreeSet;

use super::source;
use crate::config::Config;
use crate::integration::Integration;

/// Manifest keys that register a discovery matcher.
pub const DISCOVERY_KEYS: &[&str] = &[
    "bluetooth",
    "dhcp",
    "homekit",
    "mqtt",
    "ssdp",
    "usb",
    "zeroconf",
];

/// The manifest registers a discovery matcher, or the config flow handles a
/// discovery step.
pub fn discovery(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    let in_manifest = DISCOVERY_KEYS
        .iter()
        .any(|key| integration.manifest.get(*key).is_some());
    if in_manifest {
        return Vec::new();
    }

    let in_flow = source::read_module(integration, "config_flow").is_some_and(|src| {
        DISCOVERY_KEYS
            .iter()
            .any(|key| source::defines_function(&src, &format!("async_step_{key}")))
    });
    if in_flow {
        Vec::new()
    } else {
        vec!["Integration is missing discovery in the manifest and config_flow.py".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_matcher() {
        let integration = Integration::new("demo", "/nonexistent/demo", true)
            .with_manifest(json!({ "zeroconf": ["_demo._tcp.local."] }));
        assert!(discovery(&Config::new("/repo"), &integration, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_config_flow_step() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("config_flow.py"),
            "class F:\n    async def async_step_dhcp(self, info):\n        pass\n",
        )
        .expect("write");
        let integration = Integration::new("demo", dir.path(), true);
        assert!(discovery(&Config::new("/repo"), &integration, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_no_discovery() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("config_flow.py"),
            "class F:\n    async def async_step_user(self, info):\n        pass\n",
        )
        .expect("write");
        let integration = Integration::new("demo", dir.path(), true)
            .with_manifest(json!({ "domain": "demo" }));
        let errors = discovery(&Config::new("/repo"), &integration, &BTreeSet::new());
        assert_eq!(errors.len(), 1);
    }
}
