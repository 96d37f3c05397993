//! Detection of deprecated hook declarations in source trees.

mod runner;
mod suppress;
mod types;

pub use runner::Runner;
pub use suppress::{
    filter_suppressed, matches_suppression, parse_suppressions, SuppressedDiagnostic, Suppression,
    SuppressionType,
};
pub use types::{rule_matches, FailedFile, HookDiagnostic, ScanResult, RULE_NAME};
