//! Project configuration for hookcheck.
//!
//! A `hookcheck.yaml` file selects the rule source and scopes the scan.
//! Every key is optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::LANGUAGE_IDS;
use crate::hooks::DuplicatePolicy;

/// File names probed by [`discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["hookcheck.yaml", ".hookcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HookcheckConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Rule source path, relative to the config file. Bundled rules when absent.
    #[serde(default)]
    pub rules: Option<String>,
    /// What to do when two rules share an old hook signature
    #[serde(default)]
    pub duplicate_policy: Option<DuplicatePolicy>,
    /// Whether to include test files in analysis (default: false)
    #[serde(default)]
    pub include_test_files: Option<bool>,
    /// Whether to scan generated code such as `*.g.cs` or files with an
    /// `<auto-generated>` header (default: false)
    #[serde(default)]
    pub include_generated_code: Option<bool>,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/generated/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Language ids to scan; all registered languages when empty
    #[serde(default)]
    pub languages: Vec<String>,

    /// Directory the config was loaded from, for resolving `rules`.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl HookcheckConfig {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        let mut config: HookcheckConfig = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Returns whether to include test files (defaults to false).
    pub fn should_include_test_files(&self) -> bool {
        self.include_test_files.unwrap_or(false)
    }

    /// Returns whether to scan generated code (defaults to false).
    pub fn should_include_generated_code(&self) -> bool {
        self.include_generated_code.unwrap_or(false)
    }

    /// Returns the duplicate policy (defaults to first-wins).
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy.unwrap_or_default()
    }

    /// The rule source path, resolved against the config file's directory.
    pub fn resolve_rules_path(&self) -> Option<PathBuf> {
        let rules = self.rules.as_ref()?;
        let path = PathBuf::from(rules);
        if path.is_absolute() {
            return Some(path);
        }
        Some(match &self.base_dir {
            Some(dir) => dir.join(path),
            None => path,
        })
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy().replace('\\', "/");

        self.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|glob| glob.compile_matcher().is_match(&path_str))
                .unwrap_or(false)
        })
    }
}

/// Look for a config file in `dir`.
pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.as_ref().join(name))
        .find(|p| p.is_file())
}

/// Validate a config for correctness.
pub fn validate(config: &HookcheckConfig) -> anyhow::Result<()> {
    if let Some(rules) = &config.rules {
        if rules.trim().is_empty() {
            anyhow::bail!("rules path must not be empty");
        }
    }

    for language in &config.languages {
        if !LANGUAGE_IDS.contains(&language.as_str()) {
            anyhow::bail!(
                "unknown language {:?}, expected one of: {}",
                language,
                LANGUAGE_IDS.join(", ")
            );
        }
    }

    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
