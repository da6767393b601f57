//! Config entry lifecycle rules: `runtime-data`, `unique-config-entry`,
//! `config-entry-unloading`.

use std::collections::BTreeSet;

use regex::Regex;

use super::source;
use crate::config::Config;
use crate::integration::Integration;

const INIT_MODULE: &str = "__init__";

/// `type DemoConfigEntry = ConfigEntry[DemoData]`
const TYPED_ENTRY_ALIAS: &str = r"^type\s+\w+ConfigEntry\s*=\s*ConfigEntry\[";

/// Setup stores its data on `entry.runtime_data`. With `strict-typing` also
/// done, the entry type must be a typed `ConfigEntry[...]` alias.
pub fn runtime_data(
    _config: &Config,
    integration: &Integration,
    rules_done: &BTreeSet<String>,
) -> Vec<String> {
    let Some(init) = source::read_module(integration, INIT_MODULE) else {
        return vec!["Integration does not have an __init__.py".to_string()];
    };

    let mut errors = Vec::new();
    if !source::mentions(&init, ".runtime_data") {
        errors.push(
            "Integration does not store its data in entry.runtime_data (no use of `runtime_data` in __init__.py)"
                .to_string(),
        );
    }
    if rules_done.contains("strict-typing") && !has_typed_entry_alias(integration, &init) {
        errors.push(
            "Integration uses strict typing but does not declare a typed config entry (`type XConfigEntry = ConfigEntry[...]`)"
                .to_string(),
        );
    }
    errors
}

fn has_typed_entry_alias(integration: &Integration, init: &str) -> bool {
    let Ok(re) = Regex::new(TYPED_ENTRY_ALIAS) else {
        return false;
    };
    let matches = |src: &str| src.lines().any(|line| re.is_match(line));
    matches(init)
        || ["coordinator", "models", "const"]
            .iter()
            .filter_map(|m| source::read_module(integration, m))
            .any(|src| matches(&src))
}

/// Manifest declares `single_config_entry`, or the config flow sets a
/// unique id or aborts on matching entries.
pub fn unique_config_entry(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    if integration.manifest_flag("single_config_entry") {
        return Vec::new();
    }
    let guarded = source::read_module(integration, "config_flow").is_some_and(|src| {
        source::calls(&src, "async_set_unique_id")
            || source::calls(&src, "_async_abort_entries_match")
    });
    if guarded {
        Vec::new()
    } else {
        vec![
            "Integration doesn't prevent the same device or service from being able to be set up twice"
                .to_string(),
        ]
    }
}

pub fn config_entry_unloading(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    let supported = source::read_module(integration, INIT_MODULE)
        .is_some_and(|src| source::defines_function(&src, "async_unload_entry"));
    if supported {
        Vec::new()
    } else {
        vec![
            "Integration does not support config entry unloading (is missing `async_unload_entry` in __init__.py)"
                .to_string(),
        ]
    }
}
