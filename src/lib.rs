//! Hookcheck - deprecated plugin hook detection.
//!
//! Hookcheck reads a list of deprecated hook signatures and reports every
//! declared method whose name and parameter types match one of them
//! exactly, pointing at the replacement hook.
//!
//! # Architecture
//!
//! - `hooks`: Rule registry, signature canonicalization and the matcher.
//!   Knows nothing about files or parsers.
//! - `analysis`: Tree-sitter language analyzers producing declared-callable facts
//! - `detect`: Scan runner and inline suppressions
//! - `config`: YAML project configuration
//! - `report`: Output formatting (pretty, JSON, SARIF)
//! - `cli`: The `hookcheck` command line
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement `LanguageAnalyzer`
//! trait and register in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod hooks;
pub mod logging;
pub mod report;

pub use analysis::{
    register_analyzers, AnalysisContext, CallableDeclaration, CallableKind, FileFacts,
    LanguageAnalyzer, SourceLocation,
};
pub use config::HookcheckConfig;
pub use detect::{Runner, ScanResult};
pub use hooks::{DeclaredCallable, Diagnostic, Matcher, Registry, RegistryLoadError};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_analyzers();
}
