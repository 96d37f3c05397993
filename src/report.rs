//! Output formatting for hookcheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::detect::{HookDiagnostic, ScanResult, SuppressedDiagnostic, SuppressionType};
use crate::hooks::{self, Registry, Severity};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    /// Where the deprecation rules came from (`<bundled>` or a file path).
    pub rules: String,
    pub rule_count: usize,
    pub passed: bool,
    pub files_scanned: usize,
    pub callables_examined: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedDiagnostic>,
    pub suppressed_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_files: Vec<JsonFailedFile>,
}

/// One diagnostic in the JSON report.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule_id: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub help_uri: String,
    pub deprecated: String,
    #[serde(default)]
    pub replacement: Option<String>,
}

/// Suppressed diagnostic with suppression info.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppressedDiagnostic {
    pub diagnostic: JsonDiagnostic,
    pub suppression: JsonSuppression,
}

/// Suppression directive info.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSuppression {
    pub rule: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub file: String,
    pub line: usize,
    #[serde(rename = "type")]
    pub suppression_type: SuppressionType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonFailedFile {
    pub file: String,
    pub error: String,
}

/// Build the JSON report for a scan.
pub fn build_json_report(path: &str, registry: &Registry, result: &ScanResult) -> JsonReport {
    let suppressed = result
        .suppressed
        .iter()
        .map(|sd| JsonSuppressedDiagnostic {
            diagnostic: diagnostic_to_json(&sd.diagnostic),
            suppression: JsonSuppression {
                rule: sd.suppression.rule.clone(),
                reason: sd.suppression.reason.clone(),
                file: sd.suppression.file.clone(),
                line: sd.suppression.line,
                suppression_type: sd.suppression.suppression_type,
            },
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        rules: registry.origin().to_string(),
        rule_count: registry.len(),
        passed: result.is_clean(),
        files_scanned: result.scanned,
        callables_examined: result.callables,
        diagnostics: result.diagnostics.iter().map(diagnostic_to_json).collect(),
        suppressed,
        suppressed_count: result.suppressed.len(),
        failed_files: result
            .failed_files
            .iter()
            .map(|f| JsonFailedFile {
                file: f.file.clone(),
                error: f.error.clone(),
            })
            .collect(),
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, registry: &Registry, result: &ScanResult) -> anyhow::Result<()> {
    let report = build_json_report(path, registry, result);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(d: &HookDiagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        rule_id: d.rule_id.clone(),
        severity: d.severity.to_string(),
        file: d.location.file.clone(),
        line: d.location.line,
        column: d.location.column,
        message: d.message.clone(),
        help_uri: d.help_uri.clone(),
        deprecated: d.deprecated.clone(),
        replacement: d.replacement.clone(),
    }
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "hookcheck";
const RULE_NAME: &str = "DeprecatedHook";

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri")]
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "fullDescription")]
    pub full_description: SarifMessage,
    #[serde(rename = "messageStrings")]
    pub message_strings: BTreeMap<String, SarifMessage>,
    #[serde(rename = "helpUri")]
    pub help_uri: String,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
    pub properties: SarifRuleProperties,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRuleProperties {
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
    #[serde(rename = "startColumn")]
    pub start_column: usize,
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
    }
}

fn deprecated_hook_rule() -> SarifRule {
    let mut message_strings = BTreeMap::new();
    message_strings.insert(
        "default".to_string(),
        SarifMessage {
            text: hooks::MESSAGE_FORMAT.to_string(),
        },
    );

    SarifRule {
        id: hooks::RULE_ID.to_string(),
        name: RULE_NAME.to_string(),
        short_description: SarifMessage {
            text: hooks::TITLE.to_string(),
        },
        full_description: SarifMessage {
            text: hooks::DESCRIPTION.to_string(),
        },
        message_strings,
        help_uri: hooks::help_uri(hooks::RULE_ID),
        default_config: SarifRuleConfig {
            level: map_severity_to_level(Severity::Warning).to_string(),
        },
        properties: SarifRuleProperties {
            category: hooks::CATEGORY.to_string(),
        },
    }
}

/// Build the SARIF log for a scan. The rule descriptor is always present,
/// even when there are no results.
pub fn build_sarif_report(result: &ScanResult) -> SarifReport {
    let results = result
        .diagnostics
        .iter()
        .map(|d| SarifResult {
            rule_id: d.rule_id.clone(),
            level: map_severity_to_level(d.severity).to_string(),
            message: SarifMessage {
                text: d.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: d.location.file.clone(),
                    },
                    region: SarifRegion {
                        start_line: d.location.line.max(1),
                        start_column: d.location.column.max(1),
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: hooks::HELP_URI_BASE.to_string(),
                    rules: vec![deprecated_hook_rule()],
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(result: &ScanResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_sarif_report(result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, registry: &Registry, result: &ScanResult, show_suppressed: bool) {
    // Header
    println!();
    print!("  ");
    print!("{}", "hookcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // Scan info
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Rules:    ".dimmed());
    println!("{} ({} rules)", registry.origin(), registry.len());
    println!();

    write_result_summary(result);
    println!();

    if !result.diagnostics.is_empty() {
        write_diagnostics(&result.diagnostics);
        println!();
    }

    if !result.suppressed.is_empty() {
        write_suppressed_summary(&result.suppressed, show_suppressed);
        println!();
    }

    if !result.failed_files.is_empty() {
        println!("  {} ({}):", "Skipped".yellow(), result.failed_files.len());
        for f in &result.failed_files {
            println!("    {}  {}", f.file.blue(), f.error.dimmed());
        }
        println!();
    }

    write_final_status(result);
    println!();
}

fn write_result_summary(result: &ScanResult) {
    if result.is_clean() {
        print!("  {}", "✓ CLEAN".green());
    } else {
        print!("  {}", "✗ DEPRECATED HOOKS".red());
    }

    print!(
        "  {} files, {} callables",
        result.scanned, result.callables
    );

    if !result.suppressed.is_empty() {
        print!(
            "  {}",
            format!("({} suppressed)", result.suppressed.len()).dimmed()
        );
    }

    println!();
}

fn write_diagnostics(diagnostics: &[HookDiagnostic]) {
    println!("  {} ({}):", "Diagnostics".bold(), diagnostics.len());
    println!();

    for d in diagnostics {
        write_severity_tag(d.severity);
        print!("   ");
        print!("{:<10}", d.rule_id.dimmed());
        print!("{}", d.location.file.blue());
        print!(
            "{}",
            format!(":{}:{}", d.location.line, d.location.column).dimmed()
        );
        println!();

        // Message on next line, indented
        println!("            {}", d.message);
        println!();
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
    }
}

fn write_final_status(result: &ScanResult) {
    let count = result.diagnostics.len();
    if count == 0 {
        print!("{}", "  No deprecated hooks found".green());
    } else {
        let plural = if count != 1 { "s" } else { "" };
        print!(
            "{}",
            format!(
                "  {} deprecated hook{} in {} file(s)",
                count,
                plural,
                result.affected_files()
            )
            .red()
        );
    }
    println!();
}

fn write_suppressed_summary(suppressed: &[SuppressedDiagnostic], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for sd in suppressed {
        let d = &sd.diagnostic;
        let s = &sd.suppression;

        print!("    {:<10}", d.rule_id.dimmed());
        print!("{}", d.location.file.blue());
        if s.suppression_type == SuppressionType::File {
            print!("{}", ":* (file)".dimmed());
        } else {
            print!("{}", format!(":{}", d.location.line).dimmed());
        }
        println!("  {}", d.deprecated);

        if !s.reason.is_empty() {
            println!("            {}", format!("reason: {:?}", s.reason).dimmed());
        }
    }
}

// =============================================================================
// Rule listing
// =============================================================================

/// A rule as listed by `hookcheck rules --format json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRule {
    pub deprecated: String,
    #[serde(default)]
    pub replacement: Option<String>,
}

/// Rule listing in load order.
pub fn build_rule_listing(registry: &Registry) -> Vec<JsonRule> {
    registry
        .rules()
        .iter()
        .map(|rule| JsonRule {
            deprecated: rule.old_hook.canonical(),
            replacement: rule.new_hook.as_ref().map(|h| h.canonical()),
        })
        .collect()
}

pub fn write_rules_json(registry: &Registry) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_rule_listing(registry))?;
    println!("{}", json);
    Ok(())
}

pub fn write_rules_pretty(registry: &Registry) {
    println!();
    println!(
        "  {} {} ({} rules)",
        "Rules:".bold(),
        registry.origin(),
        registry.len()
    );
    println!();

    for rule in build_rule_listing(registry) {
        let replacement = match &rule.replacement {
            Some(r) => r.green(),
            None => hooks::NO_REPLACEMENT.dimmed(),
        };
        println!("    {}  →  {}", rule.deprecated.yellow(), replacement);
    }
    println!();
}
