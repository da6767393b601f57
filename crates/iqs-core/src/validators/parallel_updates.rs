//! `parallel-updates` rule.

use std::collections::BTreeSet;

use super::source;
use crate::config::Config;
use crate::integration::Integration;
use crate::platform::ENTITY_PLATFORMS;

/// Every entity platform module the integration ships sets
/// `PARALLEL_UPDATES` at module level.
pub fn parallel_updates(
    _config: &Config,
    integration: &Integration,
    _rules_done: &BTreeSet<String>,
) -> Vec<String> {
    ENTITY_PLATFORMS
        .iter()
        .filter_map(|platform| {
            let src = source::read_module(integration, platform)?;
            (!source::assigns_name(&src, "PARALLEL_UPDATES")).then(|| {
                format!("Integration does not set `PARALLEL_UPDATES` in {platform}")
            })
        })
        .collect()
}
