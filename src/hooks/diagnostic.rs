//! The deprecated-hook diagnostic and its fixed rule descriptor.

use serde::{Deserialize, Serialize};

/// Identifier of the deprecated-hook check.
pub const RULE_ID: &str = "RUST0004";

pub const TITLE: &str = "Deprecated Hook Found";

pub const CATEGORY: &str = "Hook Usage";

pub const DESCRIPTION: &str =
    "This hook has been marked as deprecated and should be replaced with the new version.";

/// SARIF message template; `{0}` is the deprecated signature, `{1}` the replacement.
/// Must stay in sync with [`format_message`].
pub const MESSAGE_FORMAT: &str = "Hook \"{0}\" is deprecated. Use \"{1}\" instead.";

/// Replacement text used when a rule has no new hook.
pub const NO_REPLACEMENT: &str = "no replacement";

pub const HELP_URI_BASE: &str = "https://github.com/rust-analyzer/docs/";

/// Severity of a diagnostic. The deprecated-hook check only reports warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Documentation link for a rule id.
pub fn help_uri(rule_id: &str) -> String {
    format!("{}{}.md", HELP_URI_BASE, rule_id)
}

/// Format the diagnostic message for a deprecated signature.
pub fn format_message(deprecated: &str, replacement: Option<&str>) -> String {
    format!(
        "Hook \"{}\" is deprecated. Use \"{}\" instead.",
        deprecated,
        replacement.unwrap_or(NO_REPLACEMENT)
    )
}

/// A report that a declared callable matches a deprecated hook.
///
/// `L` is whatever location token the fact source attached to the callable;
/// it is copied through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic<L> {
    pub rule_id: String,
    pub severity: Severity,
    pub location: L,
    pub message: String,
    pub help_uri: String,
    /// Canonical signature of the deprecated hook.
    pub deprecated: String,
    /// Canonical signature of the replacement, if the rule names one.
    pub replacement: Option<String>,
}

impl<L> Diagnostic<L> {
    /// Build a deprecated-hook diagnostic.
    pub fn deprecated_hook(location: L, deprecated: String, replacement: Option<String>) -> Self {
        Self {
            rule_id: RULE_ID.to_string(),
            severity: Severity::Warning,
            location,
            message: format_message(&deprecated, replacement.as_deref()),
            help_uri: help_uri(RULE_ID),
            deprecated,
            replacement,
        }
    }
}
