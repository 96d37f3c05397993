//! Core types for scan results.

use serde::{Deserialize, Serialize};

use crate::analysis::SourceLocation;
use crate::hooks::{Diagnostic, RULE_ID};

/// Diagnostic located in a scanned source file.
pub type HookDiagnostic = Diagnostic<SourceLocation>;

/// Human-friendly name accepted in suppression comments besides the rule id.
pub const RULE_NAME: &str = "deprecated_hook";

/// Whether a suppression directive names the given rule.
///
/// Accepts the wildcard `*`, the rule id in any case (`RUST0004`,
/// `rust0004`) and the rule name in either separator style.
pub fn rule_matches(rule_id: &str, directive: &str) -> bool {
    if directive == "*" || directive.eq_ignore_ascii_case(rule_id) {
        return true;
    }
    rule_id == RULE_ID && directive.replace('-', "_") == RULE_NAME
}

/// A file that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

/// Results of a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    /// Active diagnostics, ordered by file and then by position.
    pub diagnostics: Vec<HookDiagnostic>,
    /// Diagnostics that were suppressed by inline comments
    #[serde(default)]
    pub suppressed: Vec<super::SuppressedDiagnostic>,
    /// Number of files analyzed.
    pub scanned: usize,
    /// Number of declared callables examined.
    pub callables: usize,
    #[serde(default)]
    pub failed_files: Vec<FailedFile>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no active diagnostics remain.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of distinct files with at least one active diagnostic.
    pub fn affected_files(&self) -> usize {
        let mut files: Vec<&str> = self
            .diagnostics
            .iter()
            .map(|d| d.location.file.as_str())
            .collect();
        files.dedup();
        files.len()
    }
}
