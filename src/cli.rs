//! Command-line interface for hookcheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analysis::registered_extensions;
use crate::config::{self, HookcheckConfig, CONFIG_FILE_NAMES};
use crate::detect::Runner;
use crate::hooks::{DuplicatePolicy, Registry, RegistryLoadError};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Find declarations of deprecated plugin hooks.
///
/// Hookcheck scans C#, Java, Rust, TypeScript, Go and Python sources for
/// methods whose name and parameter types exactly match a deprecated hook,
/// and points at the replacement hook.
#[derive(Parser)]
#[command(name = "hookcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan sources for deprecated hooks
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Validate a rule source and list its rules
    Rules(RulesArgs),
    /// Create a config or rule file from a template
    Init(InitArgs),
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rule source (JSON or YAML); overrides the config file
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Fail when two rules share an old hook signature
    #[arg(long)]
    pub strict_rules: bool,

    /// Show suppressed diagnostics in output
    #[arg(long)]
    pub show_suppressed: bool,

    /// Exit 0 even when deprecated hooks are found
    #[arg(long)]
    pub no_fail: bool,
}

/// Arguments for the rules command.
#[derive(Parser)]
pub struct RulesArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rule source (JSON or YAML); overrides the config file
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Fail when two rules share an old hook signature
    #[arg(long)]
    pub strict_rules: bool,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path (default depends on the template)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Template to use
    #[arg(short, long, default_value = "minimal")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available starter templates.
struct Template {
    name: &'static str,
    description: &'static str,
    default_output: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "minimal",
        description: "Config file using the bundled deprecation rules",
        default_output: "hookcheck.yaml",
        content: include_str!("templates/hookcheck.yaml"),
    },
    Template {
        name: "rules",
        description: "Starter rule file to extend with your own deprecations",
        default_output: "deprecated_hooks.json",
        content: include_str!("templates/deprecated_hooks.json"),
    },
];

/// Directories never worth scanning.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "bin", "obj", "vendor", "__pycache__"];

/// Directories holding tests, skipped unless test files are included.
const TEST_DIRS: &[&str] = &["test", "tests", "Tests", "__tests__", "testdata", "test_data"];

/// Whether a file name follows a test naming convention.
pub fn is_test_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    let stem = name.split('.').next().unwrap_or(name);

    name.ends_with("_test.go")
        || name.ends_with("Tests.cs")
        || name.ends_with("Test.cs")
        || name.ends_with("Test.java")
        || name.ends_with("Tests.java")
        || (name.ends_with(".py") && (stem.starts_with("test_") || stem.ends_with("_test")))
        || name.contains(".test.")
        || name.contains(".spec.")
}

/// Collect source files under `root` that a registered analyzer handles.
pub fn collect_files(root: &Path, config: &HookcheckConfig) -> anyhow::Result<Vec<PathBuf>> {
    let supported_extensions = registered_extensions();
    let include_test_files = config.should_include_test_files();

    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            // Skip hidden directories
            if name.starts_with('.') {
                return false;
            }
            if SKIPPED_DIRS.contains(&name.as_ref()) {
                return false;
            }
            include_test_files || !TEST_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !supported_extensions.contains(&ext) {
            continue;
        }

        // Skip test files unless explicitly included
        if !include_test_files && is_test_file(path) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(rel) {
            tracing::debug!(file = %rel.display(), "excluded by config");
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Load the config named on the command line, or discover one in the
/// current directory. A missing config means defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<(HookcheckConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config::discover("."),
    };

    match path {
        Some(p) => {
            let cfg = HookcheckConfig::parse_file(&p)?;
            config::validate(&cfg)
                .map_err(|e| anyhow::anyhow!("invalid config {}: {}", p.display(), e))?;
            tracing::debug!(config = %p.display(), "loaded config");
            Ok((cfg, Some(p)))
        }
        None => {
            tracing::debug!(
                "no config found (looked for {}), using defaults",
                CONFIG_FILE_NAMES.join(", ")
            );
            Ok((HookcheckConfig::default(), None))
        }
    }
}

/// Load the deprecation rules. CLI flags win over the config file, which
/// wins over the bundled rules.
pub fn load_registry(
    rules: Option<&Path>,
    strict: bool,
    config: &HookcheckConfig,
) -> Result<Registry, RegistryLoadError> {
    let policy = if strict {
        DuplicatePolicy::Reject
    } else {
        config.duplicate_policy()
    };

    match rules
        .map(Path::to_path_buf)
        .or_else(|| config.resolve_rules_path())
    {
        Some(path) => Registry::load_with_policy(path, policy),
        None => Registry::bundled_with_policy(policy),
    }
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    // Validate format
    if !matches!(args.format.as_str(), "pretty" | "json" | "sarif") {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (config, _) = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Rule problems are fatal before any file is touched
    let registry = match load_registry(args.rules.as_deref(), args.strict_rules, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = if abs_path.is_dir() {
        collect_files(&abs_path, &config)?
    } else {
        vec![abs_path.clone()]
    };

    if files.is_empty() {
        tracing::warn!(path = %args.path.display(), "no files to scan");
    }

    let runner = Runner::new(&abs_path, &registry)
        .languages(config.languages.clone())
        .include_generated(config.should_include_generated_code());
    let result = runner.run(&files)?;

    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&path_str, &registry, &result)?,
        "sarif" => report::write_sarif(&result)?,
        _ => report::write_pretty(&path_str, &registry, &result, args.show_suppressed),
    }

    if result.is_clean() || args.no_fail {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the rules command.
pub fn run_rules(args: &RulesArgs) -> anyhow::Result<i32> {
    if !matches!(args.format.as_str(), "pretty" | "json") {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (config, _) = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let registry = match load_registry(args.rules.as_deref(), args.strict_rules, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format.as_str() {
        "json" => report::write_rules_json(&registry)?,
        _ => report::write_rules_pretty(&registry),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // List mode
    if args.list {
        return list_templates();
    }

    // Find template
    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'hookcheck init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(template.default_output));

    // Check if output already exists
    if output.exists() {
        eprintln!("Error: file already exists: {}", output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&output, template.content) {
        eprintln!("Error: failed to write {}: {}", output.display(), e);
        return Ok(EXIT_ERROR);
    }

    // Success message
    println!("Created {} from template '{}'", output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", output.display());
    if template.name == "rules" {
        println!("  2. Run: hookcheck rules --rules {}", output.display());
    } else {
        println!("  2. Run: hookcheck lint . --config {}", output.display());
    }

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "minimal" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  hookcheck init --template <name>");

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_alias_and_flags() {
        let cli = Cli::try_parse_from([
            "hookcheck",
            "check",
            "plugins",
            "--strict-rules",
            "-f",
            "sarif",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Lint(args) => {
                assert_eq!(args.path, PathBuf::from("plugins"));
                assert!(args.strict_rules);
                assert_eq!(args.format, "sarif");
                assert!(!args.no_fail);
            }
            _ => panic!("expected lint"),
        }
    }

    #[test]
    fn test_templates_are_valid() {
        let config: HookcheckConfig = serde_yaml::from_str(TEMPLATES[0].content).unwrap();
        config::validate(&config).unwrap();

        let registry = Registry::from_json_str(TEMPLATES[1].content, "template").unwrap();
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file(Path::new("hooks_test.go")));
        assert!(is_test_file(Path::new("PluginTests.cs")));
        assert!(is_test_file(Path::new("test_plugin.py")));
        assert!(is_test_file(Path::new("plugin.spec.ts")));
        assert!(!is_test_file(Path::new("Plugin.cs")));
        assert!(!is_test_file(Path::new("contest.py")));
    }

    #[test]
    fn test_collect_files_filters() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("src/generated")).unwrap();
        std::fs::create_dir_all(root.join("tests")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        for file in [
            "src/Plugin.cs",
            "src/plugin.py",
            "src/README.md",
            "src/generated/Hooks.cs",
            "src/PluginTests.cs",
            "tests/Other.cs",
            ".git/Hidden.cs",
        ] {
            std::fs::write(root.join(file), "").unwrap();
        }

        let config = HookcheckConfig {
            excluded_paths: vec!["**/generated/**".to_string()],
            ..Default::default()
        };
        let files = collect_files(root, &config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/Plugin.cs", "src/plugin.py"]);

        let with_tests = HookcheckConfig {
            include_test_files: Some(true),
            ..Default::default()
        };
        assert_eq!(collect_files(root, &with_tests).unwrap().len(), 5);
    }

    #[test]
    fn test_load_registry_precedence() {
        let temp = TempDir::new().unwrap();
        let rules = temp.path().join("rules.json");
        std::fs::write(
            &rules,
            r#"[{"oldHook": {"hookName": "OnTick", "hookParameters": []}}]"#,
        )
        .unwrap();

        let config = HookcheckConfig::default();
        let bundled = load_registry(None, false, &config).unwrap();
        assert_eq!(bundled.origin(), crate::hooks::BUNDLED_ORIGIN);

        let explicit = load_registry(Some(&rules), false, &config).unwrap();
        assert_eq!(explicit.len(), 1);

        let missing = load_registry(Some(&temp.path().join("nope.json")), false, &config);
        assert!(matches!(missing, Err(RegistryLoadError::NotFound { .. })));
    }

    const TICK_RULES: &str = r#"[{"oldHook": {"hookName": "OnTick", "hookParameters": []}}]"#;

    const DUPLICATE_RULES: &str = r#"[
        {"oldHook": {"hookName": "OnTick", "hookParameters": []}},
        {"oldHook": {"hookName": "OnTick", "hookParameters": []}}
    ]"#;

    /// A project with one plugin, a config and the given rule file.
    fn project(plugin: &str, rules: &str, config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("plugins")).unwrap();
        std::fs::write(temp.path().join("plugins/Plugin.cs"), plugin).unwrap();
        std::fs::write(temp.path().join("rules.json"), rules).unwrap();
        std::fs::write(temp.path().join("hookcheck.yaml"), config).unwrap();
        temp
    }

    fn lint_args(temp: &TempDir) -> LintArgs {
        LintArgs {
            path: temp.path().join("plugins"),
            config: Some(temp.path().join("hookcheck.yaml")),
            rules: Some(temp.path().join("rules.json")),
            format: "json".to_string(),
            strict_rules: false,
            show_suppressed: false,
            no_fail: false,
        }
    }

    fn rules_args(temp: &TempDir) -> RulesArgs {
        RulesArgs {
            config: Some(temp.path().join("hookcheck.yaml")),
            rules: None,
            strict_rules: false,
            format: "json".to_string(),
        }
    }

    const DEPRECATED_PLUGIN: &str = "class Plugin { void OnTick() {} }";

    #[test]
    fn test_lint_exit_codes() {
        let temp = project(DEPRECATED_PLUGIN, TICK_RULES, "version: \"1.0\"\n");
        assert_eq!(run_lint(&lint_args(&temp)).unwrap(), EXIT_FAILED);

        let no_fail = LintArgs {
            no_fail: true,
            ..lint_args(&temp)
        };
        assert_eq!(run_lint(&no_fail).unwrap(), EXIT_SUCCESS);

        let clean = project("class Plugin { void OnFrame() {} }", TICK_RULES, "version: \"1.0\"\n");
        assert_eq!(run_lint(&lint_args(&clean)).unwrap(), EXIT_SUCCESS);

        let bad_format = LintArgs {
            format: "xml".to_string(),
            ..lint_args(&temp)
        };
        assert_eq!(run_lint(&bad_format).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_lint_rule_load_failure_is_fatal() {
        // The plugin would fail the scan; a broken rule source must win
        let malformed = r#"[{"oldHook": {"hookName": "OnTick"}}]"#;
        let temp = project(DEPRECATED_PLUGIN, malformed, "version: \"1.0\"\n");
        assert_eq!(run_lint(&lint_args(&temp)).unwrap(), EXIT_ERROR);

        let no_fail = LintArgs {
            no_fail: true,
            ..lint_args(&temp)
        };
        assert_eq!(run_lint(&no_fail).unwrap(), EXIT_ERROR);

        let missing = LintArgs {
            rules: Some(temp.path().join("nope.json")),
            ..lint_args(&temp)
        };
        assert_eq!(run_lint(&missing).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_lint_strict_rules_rejects_duplicates() {
        let temp = project(DEPRECATED_PLUGIN, DUPLICATE_RULES, "version: \"1.0\"\n");
        assert_eq!(run_lint(&lint_args(&temp)).unwrap(), EXIT_FAILED);

        let strict = LintArgs {
            strict_rules: true,
            ..lint_args(&temp)
        };
        assert_eq!(run_lint(&strict).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_rules_command_uses_config() {
        let first_wins = project(
            DEPRECATED_PLUGIN,
            DUPLICATE_RULES,
            "rules: rules.json\nduplicate_policy: first-wins\n",
        );
        assert_eq!(run_rules(&rules_args(&first_wins)).unwrap(), EXIT_SUCCESS);

        // The bundled rules load fine, so an error proves the config was read
        let reject = project(
            DEPRECATED_PLUGIN,
            DUPLICATE_RULES,
            "rules: rules.json\nduplicate_policy: reject\n",
        );
        assert_eq!(run_rules(&rules_args(&reject)).unwrap(), EXIT_ERROR);

        let overridden = RulesArgs {
            rules: Some(reject.path().join("override.json")),
            ..rules_args(&reject)
        };
        std::fs::write(reject.path().join("override.json"), TICK_RULES).unwrap();
        assert_eq!(run_rules(&overridden).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn test_rules_config_flag_parses() {
        let cli = Cli::try_parse_from(["hookcheck", "rules", "-c", "hookcheck.yaml"]).unwrap();
        match cli.command {
            Commands::Rules(args) => {
                assert_eq!(args.config, Some(PathBuf::from("hookcheck.yaml")));
                assert!(args.rules.is_none());
            }
            _ => panic!("expected rules"),
        }
    }
}
