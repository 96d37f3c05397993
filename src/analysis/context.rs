//! Analysis context for extracting facts from a set of files.
//!
//! Files are analyzed one at a time or as a batch on the rayon pool. Batches
//! come back sorted by path regardless of scheduling.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analysis::{get_analyzer, is_generated, FileFacts};

/// Analysis context for a set of files.
///
/// Paths in the produced facts are relative to `base_dir` and use `/`
/// separators, so reports look the same on every platform.
pub struct AnalysisContext {
    /// Base directory for relative path resolution.
    base_dir: PathBuf,
    /// Extract facts from generated files instead of leaving them empty.
    include_generated: bool,
}

/// Outcome of a batch analysis.
#[derive(Debug, Default)]
pub struct BatchFacts {
    /// Facts for every file that could be analyzed, sorted by path.
    pub facts: Vec<FileFacts>,
    /// Files that could not be read or parsed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl AnalysisContext {
    /// Create a new analysis context.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            include_generated: false,
        }
    }

    /// Whether generated files are analyzed. Off by default: generated
    /// files come back as empty facts flagged `generated`.
    pub fn include_generated(mut self, include: bool) -> Self {
        self.include_generated = include;
        self
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Display path of `abs_path` relative to the base directory.
    pub fn relative_path(&self, abs_path: &Path) -> String {
        let rel = if abs_path == self.base_dir {
            // Single-file scan: the base is the file itself
            abs_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| abs_path.to_path_buf())
        } else {
            abs_path
                .strip_prefix(&self.base_dir)
                .unwrap_or(abs_path)
                .to_path_buf()
        };
        rel.to_string_lossy().replace('\\', "/")
    }

    /// Analyze a single file.
    ///
    /// Files no analyzer handles yield empty facts with language `unknown`.
    /// Generated files yield empty facts unless `include_generated` is set.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<FileFacts> {
        let abs_path = self.absolute(path.as_ref());
        let rel_path = self.relative_path(&abs_path);

        // Determine language from extension
        let ext = abs_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        let analyzer = match get_analyzer(ext) {
            Some(a) => a,
            // Return empty facts for unsupported files
            None => return Ok(FileFacts::empty(&rel_path, "unknown")),
        };

        // Read and parse file
        let source = fs::read(&abs_path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", abs_path.display(), e))?;

        let generated = is_generated(&abs_path, &String::from_utf8_lossy(&source));
        if generated && !self.include_generated {
            tracing::debug!(file = %rel_path, "skipping generated file");
            let mut facts = FileFacts::empty(&rel_path, analyzer.language_id());
            facts.generated = true;
            return Ok(facts);
        }

        let parsed = analyzer.parse(&abs_path, &source)?;
        let mut facts = analyzer.extract_facts(&parsed)?;
        facts.path = rel_path;
        facts.generated = generated;

        if facts.has_parse_errors {
            tracing::debug!(file = %facts.path, "file has syntax errors, facts may be partial");
        }
        tracing::debug!(
            file = %facts.path,
            language = analyzer.language_id(),
            callables = facts.callables.len(),
            "analyzed file"
        );

        Ok(facts)
    }

    /// Analyze multiple files.
    ///
    /// Processes files sequentially. For parallel processing, use
    /// `analyze_files_parallel`.
    pub fn analyze_files(&self, paths: &[PathBuf]) -> BatchFacts {
        let results: Vec<_> = paths.iter().map(|p| (p, self.analyze_file(p))).collect();
        self.collect_batch(results)
    }

    /// Analyze multiple files in parallel.
    ///
    /// Uses rayon for parallel processing. Results are sorted by path.
    pub fn analyze_files_parallel(&self, paths: &[PathBuf]) -> BatchFacts {
        let results: Vec<_> = paths
            .par_iter()
            .map(|p| (p, self.analyze_file(p)))
            .collect();
        self.collect_batch(results)
    }

    fn collect_batch(&self, results: Vec<(&PathBuf, anyhow::Result<FileFacts>)>) -> BatchFacts {
        let mut batch = BatchFacts::default();

        for (path, result) in results {
            match result {
                Ok(facts) => batch.facts.push(facts),
                Err(e) => {
                    // Log but don't fail - some files may not be parseable
                    let rel = self.relative_path(&self.absolute(path));
                    tracing::warn!(file = %rel, error = %e, "failed to analyze file");
                    batch.failed.push((rel, e.to_string()));
                }
            }
        }

        // Sort by path for deterministic ordering
        batch.facts.sort_by(|a, b| a.path.cmp(&b.path));
        batch.failed.sort();

        batch
    }
}
