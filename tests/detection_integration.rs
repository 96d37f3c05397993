//! Integration tests for the full detection pipeline.
//!
//! These tests scan the plugin fixtures in testdata/ with the fixture
//! config and rule file, the same way `hookcheck lint` does.

use std::path::{Path, PathBuf};

use hookcheck::cli::collect_files;
use hookcheck::config::HookcheckConfig;
use hookcheck::detect::{Runner, ScanResult, SuppressionType};
use hookcheck::hooks::{DuplicatePolicy, Registry};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn setup() {
    hookcheck::init();
}

fn load_config() -> HookcheckConfig {
    let config =
        HookcheckConfig::parse_file(testdata_path().join("hookcheck.yaml")).expect("should parse config");
    hookcheck::config::validate(&config).expect("config should be valid");
    config
}

/// Load the fixture config and rules and scan testdata/plugins.
fn run_detection() -> ScanResult {
    setup();

    let config = load_config();
    let rules = config.resolve_rules_path().expect("config names a rule file");
    let registry =
        Registry::load_with_policy(&rules, config.duplicate_policy()).expect("rules should load");

    let root = testdata_path().join("plugins");
    let files = collect_files(&root, &config).expect("should collect files");

    Runner::new(&root, &registry)
        .languages(config.languages.clone())
        .run(&files)
        .expect("detection should succeed")
}

fn locations(result: &ScanResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .map(|d| d.location.to_string())
        .collect()
}

#[test]
fn test_detection_finds_deprecated_hooks_in_every_language() {
    let result = run_detection();

    assert_eq!(
        locations(&result),
        vec![
            "Deploy.java:4:17",
            "Welcome.cs:9:14",
            "hooks.go:5:18",
            "hooks.ts:2:5",
            "metabolism.rs:4:12",
        ]
    );
}

#[test]
fn test_detection_messages() {
    let result = run_detection();

    let welcome = result
        .diagnostics
        .iter()
        .find(|d| d.location.file == "Welcome.cs")
        .expect("Welcome.cs should have a diagnostic");
    assert_eq!(
        welcome.message,
        r#"Hook "OnPlayerInit(BasePlayer)" is deprecated. Use "OnPlayerConnected(BasePlayer)" instead."#
    );

    let ts = result
        .diagnostics
        .iter()
        .find(|d| d.location.file == "hooks.ts")
        .expect("hooks.ts should have a diagnostic");
    assert_eq!(ts.deprecated, "OnTick()");
    assert_eq!(ts.replacement, None);
    assert!(ts.message.ends_with(r#"Use "no replacement" instead."#));

    for d in &result.diagnostics {
        assert_eq!(d.rule_id, "RUST0004");
        assert_eq!(d.help_uri, "https://github.com/rust-analyzer/docs/RUST0004.md");
    }
}

#[test]
fn test_detection_ignores_near_misses() {
    let result = run_detection();

    // Swapped parameters, the replacement hook itself, a snake_case function
    // and an overload with an extra parameter must not fire.
    let deprecated: Vec<_> = result
        .diagnostics
        .iter()
        .map(|d| (d.location.file.as_str(), d.deprecated.as_str()))
        .collect();
    assert!(!deprecated.contains(&("Welcome.cs", "OnPlayerDie(BasePlayer, HitInfo)")));
    assert_eq!(
        result
            .diagnostics
            .iter()
            .filter(|d| d.location.file == "Welcome.cs")
            .count(),
        1
    );
    assert_eq!(
        result
            .diagnostics
            .iter()
            .filter(|d| d.location.file == "hooks.ts")
            .count(),
        1
    );
}

#[test]
fn test_detection_applies_suppressions() {
    let result = run_detection();

    let mut suppressed: Vec<_> = result
        .suppressed
        .iter()
        .map(|s| {
            (
                s.diagnostic.location.to_string(),
                s.suppression.suppression_type,
            )
        })
        .collect();
    suppressed.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        suppressed,
        vec![
            ("Deploy.java:7:17".to_string(), SuppressionType::Line),
            ("Welcome.cs:19:14".to_string(), SuppressionType::NextLine),
            ("plugin.py:3:9".to_string(), SuppressionType::File),
            ("plugin.py:6:9".to_string(), SuppressionType::File),
        ]
    );

    let legacy = result
        .suppressed
        .iter()
        .find(|s| s.diagnostic.location.file == "Welcome.cs")
        .unwrap();
    assert_eq!(legacy.suppression.reason, "kept for legacy servers");
}

#[test]
fn test_detection_respects_excluded_paths() {
    let result = run_detection();

    assert_eq!(result.scanned, 6, "generated/ should be excluded");
    assert!(result.failed_files.is_empty());
    assert!(!result
        .diagnostics
        .iter()
        .chain(result.suppressed.iter().map(|s| &s.diagnostic))
        .any(|d| d.location.file.contains("generated")));
}

#[test]
fn test_detection_language_filter() {
    setup();

    let config = HookcheckConfig {
        languages: vec!["csharp".to_string(), "python".to_string()],
        ..load_config()
    };
    let registry = Registry::load(config.resolve_rules_path().unwrap()).unwrap();
    let root = testdata_path().join("plugins");
    let files = collect_files(&root, &config).unwrap();

    let result = Runner::new(&root, &registry)
        .languages(config.languages.clone())
        .run(&files)
        .unwrap();

    assert_eq!(result.scanned, 2);
    assert_eq!(locations(&result), vec!["Welcome.cs:9:14"]);
    assert_eq!(result.suppressed.len(), 3);
}

#[test]
fn test_detection_is_idempotent() {
    let first = run_detection();
    let second = run_detection();

    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.callables, second.callables);
}

#[test]
fn test_detection_single_file() {
    setup();

    let registry = Registry::load(testdata_path().join("rules/oxide_hooks.json")).unwrap();
    let file = testdata_path().join("plugins/Welcome.cs");

    let result = Runner::new(&file, &registry)
        .run(&[file.clone()])
        .unwrap();

    assert_eq!(result.scanned, 1);
    assert_eq!(locations(&result), vec!["Welcome.cs:9:14"]);
}

#[test]
fn test_bundled_rules_scan() {
    setup();

    let registry = Registry::bundled_with_policy(DuplicatePolicy::Reject)
        .expect("bundled rules have no duplicates");
    let root = testdata_path().join("plugins");
    let files = collect_files(&root, &HookcheckConfig::default()).unwrap();
    assert!(files.iter().any(|f| f.ends_with(Path::new("generated/Hooks.cs"))));

    let result = Runner::new(&root, &registry).run(&files).unwrap();
    assert_eq!(result.scanned, 7);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.deprecated == "OnPlayerInit(BasePlayer)"));
}
