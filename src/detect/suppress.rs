//! Inline suppression of diagnostics via comments.
//!
//! Supports suppression comments like:
//! - `// hookcheck:ignore <rule> - <reason>`
//! - `// hookcheck:ignore-next-line <rule> - <reason>`
//! - `# hookcheck:ignore-file <rule> - <reason>`
//!
//! `<rule>` is `RUST0004`, `deprecated_hook` or `*`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{rule_matches, HookDiagnostic};

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressionType {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
    /// Applies to the entire file
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    /// Rule to suppress or "*" for all
    pub rule: String,
    /// Human-readable reason
    pub reason: String,
    /// File containing the suppression
    pub file: String,
    /// Line number (0 for file-level)
    pub line: usize,
    /// How the suppression applies
    pub suppression_type: SuppressionType,
}

/// A diagnostic that was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedDiagnostic {
    pub diagnostic: HookDiagnostic,
    pub suppression: Suppression,
}

/// File-level directives are honored up to this line even after code starts.
const FILE_HEADER_LINES: usize = 10;

lazy_static::lazy_static! {
    /// Patterns for matching suppression comments.
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        // C#/Java/Rust/Go/TS style: // hookcheck:...
        Regex::new(r"//\s*hookcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
        // Block comment style: /* hookcheck:... */
        Regex::new(r"/\*\s*hookcheck:(ignore(?:-file|-next-line)?)\s+(\S+?)\s*(?:-\s*(.*?))?\s*\*/").unwrap(),
    ];

    /// Python style: # hookcheck:... (only in files with hash comments)
    static ref HASH_PATTERN: Regex =
        Regex::new(r"#\s*hookcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap();
}

/// Parse suppression directives from file content.
pub fn parse_suppressions(file_path: &str, content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;
    let hash_comments = uses_hash_comments(file_path);

    for (line_num, line) in content.lines().enumerate() {
        let line_number = line_num + 1;
        let trimmed = line.trim();

        // Check if we've passed the header section (for file-level suppressions)
        if in_header && !is_comment_or_empty(trimmed, hash_comments) {
            in_header = false;
        }

        let hash_pattern = hash_comments.then(|| &*HASH_PATTERN);
        for pattern in SUPPRESSION_PATTERNS.iter().chain(hash_pattern) {
            let caps = match pattern.captures(line) {
                Some(c) => c,
                None => continue,
            };

            let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let rule = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let reason = caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            let suppression_type = match directive {
                "ignore-file" => {
                    if !in_header && line_number > FILE_HEADER_LINES {
                        tracing::debug!(
                            file = file_path,
                            line = line_number,
                            "ignore-file outside the file header, ignoring"
                        );
                        continue;
                    }
                    SuppressionType::File
                }
                "ignore-next-line" => SuppressionType::NextLine,
                "ignore" => {
                    // Alone on its line it covers the next line, trailing code it covers this one
                    let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                    if is_comment_or_empty(line[..start].trim(), hash_comments) {
                        SuppressionType::NextLine
                    } else {
                        SuppressionType::Line
                    }
                }
                _ => continue,
            };

            suppressions.push(Suppression {
                rule: rule.to_string(),
                reason,
                file: file_path.to_string(),
                line: if suppression_type == SuppressionType::File {
                    0
                } else {
                    line_number
                },
                suppression_type,
            });
            break; // Only one suppression per line
        }
    }

    suppressions
}

fn uses_hash_comments(file_path: &str) -> bool {
    matches!(
        Path::new(file_path).extension().and_then(|e| e.to_str()),
        Some("py") | Some("pyi")
    )
}

/// Check if a line is a comment or empty.
fn is_comment_or_empty(line: &str, hash_comments: bool) -> bool {
    line.is_empty()
        || line.starts_with("//")
        || line.starts_with("/*")
        || line.starts_with('*')
        || (hash_comments && line.starts_with('#'))
}

/// Check if a diagnostic matches a suppression.
pub fn matches_suppression(diagnostic: &HookDiagnostic, suppression: &Suppression) -> bool {
    // Must be same file
    if diagnostic.location.file != suppression.file {
        return false;
    }

    if !rule_matches(&diagnostic.rule_id, &suppression.rule) {
        return false;
    }

    let line = diagnostic.location.line;
    match suppression.suppression_type {
        SuppressionType::File => true,
        SuppressionType::Line => line == suppression.line,
        SuppressionType::NextLine => line == suppression.line + 1,
    }
}

/// Separate diagnostics into active and suppressed based on suppressions.
pub fn filter_suppressed(
    diagnostics: Vec<HookDiagnostic>,
    suppressions: &[Suppression],
) -> (Vec<HookDiagnostic>, Vec<SuppressedDiagnostic>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for diagnostic in diagnostics {
        match suppressions
            .iter()
            .find(|s| matches_suppression(&diagnostic, s))
        {
            Some(suppression) => suppressed.push(SuppressedDiagnostic {
                diagnostic,
                suppression: suppression.clone(),
            }),
            None => active.push(diagnostic),
        }
    }

    (active, suppressed)
}
