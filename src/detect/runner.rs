//! Detection runner that drives a scan from files to diagnostics.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::analysis::{get_analyzer, AnalysisContext};
use crate::hooks::{Matcher, Registry};

use super::{filter_suppressed, parse_suppressions, FailedFile, ScanResult};

/// Scans a set of files for declarations of deprecated hooks.
pub struct Runner<'r> {
    base_dir: PathBuf,
    registry: &'r Registry,
    languages: Vec<String>,
    include_generated: bool,
}

impl<'r> Runner<'r> {
    /// Create a new detection runner.
    pub fn new<P: AsRef<Path>>(base_dir: P, registry: &'r Registry) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            registry,
            languages: Vec::new(),
            include_generated: false,
        }
    }

    /// Restrict the scan to the given language ids. Empty means all.
    pub fn languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    /// Scan generated files too. They are skipped by default.
    pub fn include_generated(mut self, include: bool) -> Self {
        self.include_generated = include;
        self
    }

    fn wants(&self, path: &Path) -> bool {
        if self.languages.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(get_analyzer)
            .map(|a| self.languages.iter().any(|l| l == a.language_id()))
            .unwrap_or(false)
    }

    /// Analyze `files`, match every declared callable against the registry
    /// and apply inline suppressions.
    pub fn run(&self, files: &[PathBuf]) -> anyhow::Result<ScanResult> {
        let mut result = ScanResult::new();

        let selected: Vec<PathBuf> = files.iter().filter(|f| self.wants(f)).cloned().collect();
        if selected.len() < files.len() {
            tracing::debug!(
                skipped = files.len() - selected.len(),
                "files excluded by language filter"
            );
        }

        let ctx = AnalysisContext::new(&self.base_dir).include_generated(self.include_generated);
        let mut batch = ctx.analyze_files_parallel(&selected);

        if !self.include_generated {
            let before = batch.facts.len();
            batch.facts.retain(|f| !f.generated);
            if batch.facts.len() < before {
                tracing::debug!(skipped = before - batch.facts.len(), "generated files skipped");
            }
        }

        result.scanned = batch.facts.len();
        result.failed_files = batch
            .failed
            .into_iter()
            .map(|(file, error)| FailedFile { file, error })
            .collect();

        let facts: Vec<_> = batch
            .facts
            .iter()
            .flat_map(|f| f.declared_callables())
            .collect();
        result.callables = facts.len();

        let matcher = Matcher::new(self.registry);
        let diagnostics = matcher.examine_par(&facts);

        tracing::debug!(
            files = result.scanned,
            callables = result.callables,
            diagnostics = diagnostics.len(),
            "matched declared callables"
        );

        // Suppressions are only read from files that produced a diagnostic
        let flagged: BTreeSet<&str> = diagnostics
            .iter()
            .map(|d| d.location.file.as_str())
            .collect();

        let by_display: HashMap<String, &PathBuf> = selected
            .iter()
            .map(|p| (ctx.relative_path(&self.absolute(p)), p))
            .collect();

        let mut suppressions = Vec::new();
        for file in flagged {
            let path = match by_display.get(file) {
                Some(p) => self.absolute(p),
                None => continue,
            };
            match std::fs::read_to_string(&path) {
                Ok(content) => suppressions.extend(parse_suppressions(file, &content)),
                Err(e) => {
                    tracing::warn!(file, error = %e, "cannot read file for suppressions")
                }
            }
        }

        // Apply suppressions - filter diagnostics and track suppressed ones
        if suppressions.is_empty() {
            result.diagnostics = diagnostics;
        } else {
            let (active, suppressed) = filter_suppressed(diagnostics, &suppressions);
            result.diagnostics = active;
            result.suppressed = suppressed;
        }

        Ok(result)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
