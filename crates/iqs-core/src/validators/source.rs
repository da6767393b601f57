//! Line-level introspection of integration Python modules.
//!
//! Nothing is parsed or executed; checks look for definitions, module-level
//! assignments and calls, skipping comment lines.

use std::fs;

use regex::Regex;

use crate::integration::Integration;

/// Source of `<integration>/<module>.py`, if present and readable.
pub fn read_module(integration: &Integration, module: &str) -> Option<String> {
    fs::read_to_string(integration.path.join(format!("{module}.py"))).ok()
}

pub fn has_module(integration: &Integration, module: &str) -> bool {
    integration.path.join(format!("{module}.py")).is_file()
}

fn code_lines(source: &str) -> impl Iterator<Item = &str> {
    source
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
}

fn any_line_matches(source: &str, pattern: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => code_lines(source).any(|line| re.is_match(line)),
        Err(_) => false,
    }
}

/// `def name(` or `async def name(` at any indentation.
pub fn defines_function(source: &str, name: &str) -> bool {
    any_line_matches(
        source,
        &format!(r"^\s*(?:async\s+)?def\s+{}\s*\(", regex::escape(name)),
    )
}

/// Module-level `NAME = ...` or `NAME: type = ...`.
pub fn assigns_name(source: &str, name: &str) -> bool {
    any_line_matches(
        source,
        &format!(r"^{}\s*(?::[^=]+)?=[^=]", regex::escape(name)),
    )
}

/// A call `name(` or attribute call `.name(` anywhere in code.
pub fn calls(source: &str, name: &str) -> bool {
    any_line_matches(source, &format!(r"\b{}\s*\(", regex::escape(name)))
}

/// Any non-comment line containing `needle`.
pub fn mentions(source: &str, needle: &str) -> bool {
    code_lines(source).any(|line| line.contains(needle))
}
