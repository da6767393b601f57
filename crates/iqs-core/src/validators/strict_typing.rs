//! `strict-typing` rule.

use std::collections::BTreeSet;
use std::fs;

use crate::config::Config;
use crate::integration::Integration;

/// The integration's modules are listed in the project's `.strict-typing`.
pub fn strict_typing(
    config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    let entry = format!("homeassistant.components.{}.*", integration.domain);
    let listed = fs::read_to_string(config.strict_typing_path())
        .map(|text| text.lines().any(|line| line.trim() == entry))
        .unwrap_or(false);
    if listed {
        Vec::new()
    } else {
        vec![format!(
            "Integration does not have strict typing enabled (is missing `{entry}` from .strict-typing)"
        )]
    }
}
