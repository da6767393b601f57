//! `diagnostics` rule.

use std::collections::BTreeSet;

use super::source;
use crate::config::Config;
use crate::integration::Integration;

const DIAGNOSTICS_FUNCTIONS: &[&str] = &[
    "async_get_config_entry_diagnostics",
    "async_get_device_diagnostics",
];

/// `diagnostics.py` implements config entry or device diagnostics.
pub fn diagnostics(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    let Some(src) = source::read_module(integration, "diagnostics") else {
        return vec![
            "Integration does not implement the diagnostics platform (is missing diagnostics.py)"
                .to_string(),
        ];
    };
    if DIAGNOSTICS_FUNCTIONS
        .iter()
        .any(|f| source::defines_function(&src, f))
    {
        Vec::new()
    } else {
        vec![format!(
            "Integration diagnostics.py does not define {}",
            DIAGNOSTICS_FUNCTIONS.join(" or ")
        )]
    }
}
