//! Config flow rules: `config-flow`, `reauthentication-flow`,
//! `reconfiguration-flow`.

use std::collections::BTreeSet;

use super::source;
use crate::config::Config;
use crate::integration::Integration;

const CONFIG_FLOW_MODULE: &str = "config_flow";

/// Manifest sets `config_flow: true` and `config_flow.py` exists.
pub fn config_flow(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    let mut errors = Vec::new();
    if !integration.manifest_flag("config_flow") {
        errors.push("Integration does not set config_flow in its manifest".to_string());
    }
    if !source::has_module(integration, CONFIG_FLOW_MODULE) {
        errors.push("Integration does not have a config_flow.py".to_string());
    }
    errors
}

fn require_step(integration: &Integration, step: &str, what: &str) -> Vec<String> {
    let defined = source::read_module(integration, CONFIG_FLOW_MODULE)
        .is_some_and(|src| source::defines_function(&src, step));
    if defined {
        Vec::new()
    } else {
        vec![format!(
            "Integration does not support a {what} flow (is missing `{step}` in config_flow.py)"
        )]
    }
}

pub fn reauthentication_flow(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    require_step(integration, "async_step_reauth", "reauthentication")
}

pub fn reconfiguration_flow(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    require_step(integration, "async_step_reconfigure", "reconfiguration")
}
