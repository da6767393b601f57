//! Declaration document (`quality_scale.yaml`): parsing, schema check and
//! status classification.
//!
//! ```yaml
//! rules:
//!   config-flow: done
//!   docs-actions:
//!     status: exempt
//!     comment: The integration registers no actions.
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::catalog::RuleCatalog;

/// File name of the declaration document at the integration root.
pub const DECLARATION_FILE: &str = "quality_scale.yaml";

const RULES_KEY: &str = "rules";
const STATUS_KEY: &str = "status";
const COMMENT_KEY: &str = "comment";

/// Declared status of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Todo,
    Done,
    Exempt,
}

impl RuleStatus {
    /// Done or exempt: no longer outstanding.
    pub fn is_met(self) -> bool {
        matches!(self, RuleStatus::Done | RuleStatus::Exempt)
    }
}

/// A rule entry in either of its two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusEntry {
    /// `rule: done`
    Bare(RuleStatus),
    /// `rule: { status: exempt, comment: ... }`
    Detailed {
        status: RuleStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
}

impl StatusEntry {
    pub fn status(&self) -> RuleStatus {
        match self {
            StatusEntry::Bare(status) => *status,
            StatusEntry::Detailed { status, .. } => *status,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            StatusEntry::Bare(_) => None,
            StatusEntry::Detailed { comment, .. } => comment.as_deref(),
        }
    }
}

/// The document could not be read as a YAML mapping.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("top level is not a mapping")]
    NotAMapping,
}

/// Parse declaration text. The top level must be a mapping.
pub fn parse_declaration(text: &str) -> Result<Value, ParseError> {
    let doc: Value = serde_yaml::from_str(text)?;
    if !doc.is_mapping() {
        return Err(ParseError::NotAMapping);
    }
    Ok(doc)
}

pub fn load_declaration(path: &Path) -> Result<Value, ParseError> {
    let text = fs::read_to_string(path)?;
    parse_declaration(&text)
}

/// Longest rendering of an offending value before it is cut short.
const MAX_GOT_LEN: usize = 500;

/// One schema violation, located by its key path from the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: Vec<String>,
    pub message: String,
    /// Rendering of the value found at `path`, `None` when absent.
    pub got: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.path.is_empty() {
            f.write_str(" @ data")?;
            for key in &self.path {
                write!(f, "['{key}']")?;
            }
        }
        write!(f, ". Got {}", self.got)
    }
}

/// All schema violations found in a document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolations(pub Vec<SchemaViolation>);

impl SchemaViolations {
    pub fn iter(&self) -> impl Iterator<Item = &SchemaViolation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SchemaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaViolations {}

struct SchemaWalker<'a> {
    catalog: &'a RuleCatalog,
    violations: Vec<SchemaViolation>,
}

impl SchemaWalker<'_> {
    fn report(&mut self, path: &[String], message: impl Into<String>, got: Option<&Value>) {
        self.violations.push(SchemaViolation {
            path: path.to_vec(),
            message: message.into(),
            got: got.map_or_else(|| "None".to_string(), render_got),
        });
    }

    fn document(&mut self, doc: &Value) {
        let Some(top) = doc.as_mapping() else {
            self.report(&[], "expected a dictionary", Some(doc));
            return;
        };

        for (key, value) in top {
            if key.as_str() != Some(RULES_KEY) {
                self.report(&[render_key(key)], "extra keys not allowed", Some(value));
            }
        }

        let path = [RULES_KEY.to_string()];
        match top.get(RULES_KEY) {
            None => self.report(&path, "required key not provided", None),
            Some(Value::Mapping(rules)) => self.rules(&path, rules),
            Some(other) => {
                self.report(&path, "expected a dictionary for dictionary value", Some(other))
            }
        }
    }

    fn rules(&mut self, base: &[String], rules: &Mapping) {
        for (key, entry) in rules {
            let mut path = base.to_vec();
            path.push(render_key(key));
            match key.as_str() {
                Some(name) if self.catalog.contains(name) => self.entry(&path, entry),
                _ => self.report(&path, "extra keys not allowed", Some(entry)),
            }
        }
    }

    fn entry(&mut self, path: &[String], entry: &Value) {
        match entry {
            Value::String(s) if s == "todo" || s == "done" => {}
            Value::String(s) if s == "exempt" => self.report(
                path,
                "exempt requires a dictionary with status and comment",
                Some(entry),
            ),
            Value::String(_) => {
                self.report(path, "value must be one of ['done', 'todo']", Some(entry))
            }
            Value::Mapping(fields) => self.detailed_entry(path, fields),
            other => self.report(path, "expected a status or a dictionary", Some(other)),
        }
    }

    fn detailed_entry(&mut self, path: &[String], fields: &Mapping) {
        let child = |key: &str| {
            let mut p = path.to_vec();
            p.push(key.to_string());
            p
        };

        for (key, value) in fields {
            match key.as_str() {
                Some(STATUS_KEY) | Some(COMMENT_KEY) => {}
                _ => self.report(&child(&render_key(key)), "extra keys not allowed", Some(value)),
            }
        }

        let status = match fields.get(STATUS_KEY) {
            None => {
                self.report(&child(STATUS_KEY), "required key not provided", None);
                None
            }
            Some(Value::String(s)) if matches!(s.as_str(), "todo" | "done" | "exempt") => {
                Some(s.as_str())
            }
            Some(other) => {
                self.report(
                    &child(STATUS_KEY),
                    "value must be one of ['done', 'exempt', 'todo']",
                    Some(other),
                );
                None
            }
        };

        match fields.get(COMMENT_KEY) {
            Some(Value::String(_)) => {}
            Some(other) => self.report(&child(COMMENT_KEY), "expected str", Some(other)),
            None if status == Some("exempt") => {
                self.report(&child(COMMENT_KEY), "required key not provided", None)
            }
            None => {}
        }
    }
}

/// Check a parsed document against the declaration schema.
pub fn validate_schema(doc: &Value, catalog: &RuleCatalog) -> Result<(), SchemaViolations> {
    let mut walker = SchemaWalker {
        catalog,
        violations: Vec::new(),
    };
    walker.document(doc);
    if walker.violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaViolations(walker.violations))
    }
}

/// Rule names split by declared status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleClassification {
    /// Done or exempt.
    pub met: BTreeSet<String>,
    /// Exactly done.
    pub done: BTreeSet<String>,
}

/// Status of a raw rule entry in either shape. Only the `status` field of
/// a mapping is read, so a bad `comment` does not hide the status.
pub fn entry_status(entry: &Value) -> Option<RuleStatus> {
    let status = match entry {
        Value::Mapping(fields) => fields.get(STATUS_KEY)?,
        bare => bare,
    };
    serde_yaml::from_value(status.clone()).ok()
}

/// Classify the rule entries of a parsed document.
///
/// Tolerant of schema violations: entries whose status cannot be read are
/// ignored, so classification still runs on a document that failed the
/// schema check.
pub fn classify(doc: &Value) -> RuleClassification {
    let mut out = RuleClassification::default();
    let Some(rules) = doc.get(RULES_KEY).and_then(Value::as_mapping) else {
        return out;
    };

    for (key, entry) in rules {
        let Some(name) = key.as_str() else {
            continue;
        };
        let Some(status) = entry_status(entry) else {
            continue;
        };
        if status.is_met() {
            out.met.insert(name.to_string());
        }
        if status == RuleStatus::Done {
            out.done.insert(name.to_string());
        }
    }
    out
}

fn render_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => render_value(other),
    }
}

/// Offending value as shown after `Got`, cut to [`MAX_GOT_LEN`].
fn render_got(value: &Value) -> String {
    let rendered = render_value(value);
    if rendered.chars().count() <= MAX_GOT_LEN {
        return rendered;
    }
    let mut cut: String = rendered.chars().take(MAX_GOT_LEN - 3).collect();
    cut.push_str("...");
    cut
}

/// Python-literal style rendering: `'text'`, `None`, `True`, `[1, 2]`,
/// `{'status': 'done'}`.
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.contains('\'') && !s.contains('"') => format!("\"{s}\""),
        Value::String(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", render_value(k), render_value(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Tagged(tagged) => render_value(&tagged.value),
    }
}
