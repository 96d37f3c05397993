//! Deprecation registry: the loaded rule set and its signature index.
//!
//! Rules come from a JSON or YAML document listing entries of the form:
//!
//! ```json
//! [
//!   {
//!     "oldHook": { "hookName": "OnTick", "hookParameters": ["int"] },
//!     "newHook": { "hookName": "OnUpdate", "hookParameters": ["int", "float"] }
//!   },
//!   {
//!     "oldHook": { "hookName": "OnLegacy", "hookParameters": [] },
//!     "newHook": null
//!   }
//! ]
//! ```
//!
//! A registry is built once and is read-only afterwards, so a shared
//! reference can be handed to any number of matcher threads.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::signature::HookSignature;

/// Rule file compiled into the binary, used when no rule source is configured.
const BUNDLED_RULES: &str = include_str!("deprecated_hooks.json");

/// Origin label for the bundled rule set.
pub const BUNDLED_ORIGIN: &str = "<bundled>";

/// A single deprecation: the old hook and its replacement, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeprecationRule {
    #[serde(rename = "oldHook")]
    pub old_hook: HookSignature,
    #[serde(rename = "newHook", default)]
    pub new_hook: Option<HookSignature>,
}

impl DeprecationRule {
    pub fn new(old_hook: HookSignature, new_hook: Option<HookSignature>) -> Self {
        Self { old_hook, new_hook }
    }
}

/// How to treat two rules sharing the same old signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first rule in load order; later duplicates are shadowed.
    #[default]
    FirstWins,
    /// Fail the load.
    Reject,
}

/// Errors raised while loading a rule source. All of them are fatal.
#[derive(Debug, Error)]
pub enum RegistryLoadError {
    #[error("rule source not found: {path}")]
    NotFound { path: String },

    #[error("failed to read rule source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in rule source {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed YAML in rule source {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid rule #{index} in {origin}: {reason}")]
    Schema {
        origin: String,
        index: usize,
        reason: String,
    },

    #[error(
        "duplicate deprecated hook {signature:?} in {origin} (rules #{first} and #{second})"
    )]
    DuplicateOldHook {
        origin: String,
        signature: String,
        first: usize,
        second: usize,
    },
}

/// The loaded set of deprecation rules, indexed by canonical old signature.
#[derive(Debug, Clone)]
pub struct Registry {
    origin: String,
    rules: Vec<DeprecationRule>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Load rules from a file with the default duplicate policy.
    ///
    /// `.yaml` and `.yml` files are read as YAML, anything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RegistryLoadError> {
        Self::load_with_policy(path, DuplicatePolicy::default())
    }

    /// Load rules from a file with an explicit duplicate policy.
    pub fn load_with_policy<P: AsRef<Path>>(
        path: P,
        policy: DuplicatePolicy,
    ) -> Result<Self, RegistryLoadError> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RegistryLoadError::NotFound {
                    path: origin.clone(),
                }
            } else {
                RegistryLoadError::Io {
                    path: origin.clone(),
                    source: e,
                }
            }
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let rules = if is_yaml {
            parse_yaml(&content, &origin)?
        } else {
            parse_json(&content, &origin)?
        };

        Self::with_policy(rules, &origin, policy)
    }

    /// Build a registry from a JSON document.
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, RegistryLoadError> {
        let rules = parse_json(content, origin)?;
        Self::with_policy(rules, origin, DuplicatePolicy::default())
    }

    /// Build a registry from a YAML document.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self, RegistryLoadError> {
        let rules = parse_yaml(content, origin)?;
        Self::with_policy(rules, origin, DuplicatePolicy::default())
    }

    /// The rule set shipped with the binary.
    pub fn bundled() -> Result<Self, RegistryLoadError> {
        Self::bundled_with_policy(DuplicatePolicy::default())
    }

    pub fn bundled_with_policy(policy: DuplicatePolicy) -> Result<Self, RegistryLoadError> {
        let rules = parse_json(BUNDLED_RULES, BUNDLED_ORIGIN)?;
        Self::with_policy(rules, BUNDLED_ORIGIN, policy)
    }

    /// Validate and index an already-deserialized rule list.
    pub fn with_policy(
        rules: Vec<DeprecationRule>,
        origin: &str,
        policy: DuplicatePolicy,
    ) -> Result<Self, RegistryLoadError> {
        let mut index = HashMap::with_capacity(rules.len());

        for (i, rule) in rules.iter().enumerate() {
            validate_rule(rule).map_err(|reason| RegistryLoadError::Schema {
                origin: origin.to_string(),
                index: i,
                reason,
            })?;

            match index.entry(rule.old_hook.canonical()) {
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
                Entry::Occupied(existing) => match policy {
                    DuplicatePolicy::FirstWins => {
                        tracing::warn!(
                            origin,
                            signature = %existing.key(),
                            kept = *existing.get(),
                            shadowed = i,
                            "duplicate deprecated hook, keeping the first rule"
                        );
                    }
                    DuplicatePolicy::Reject => {
                        return Err(RegistryLoadError::DuplicateOldHook {
                            origin: origin.to_string(),
                            signature: existing.key().clone(),
                            first: *existing.get(),
                            second: i,
                        });
                    }
                },
            }
        }

        tracing::debug!(origin, rules = rules.len(), "loaded deprecation rules");

        Ok(Self {
            origin: origin.to_string(),
            rules,
            index,
        })
    }

    /// Find the rule whose old hook matches `signature` exactly.
    pub fn lookup(&self, signature: &HookSignature) -> Option<&DeprecationRule> {
        self.lookup_canonical(&signature.canonical())
    }

    /// Find the rule whose old hook canonicalizes to `canonical`.
    pub fn lookup_canonical(&self, canonical: &str) -> Option<&DeprecationRule> {
        self.index.get(canonical).map(|&i| &self.rules[i])
    }

    /// All rules in load order, including shadowed duplicates.
    pub fn rules(&self) -> &[DeprecationRule] {
        &self.rules
    }

    /// Where the rules were loaded from (a path or `<bundled>`).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_json(content: &str, origin: &str) -> Result<Vec<DeprecationRule>, RegistryLoadError> {
    serde_json::from_str(content).map_err(|e| RegistryLoadError::Json {
        origin: origin.to_string(),
        source: e,
    })
}

fn parse_yaml(content: &str, origin: &str) -> Result<Vec<DeprecationRule>, RegistryLoadError> {
    serde_yaml::from_str(content).map_err(|e| RegistryLoadError::Yaml {
        origin: origin.to_string(),
        source: e,
    })
}

fn validate_rule(rule: &DeprecationRule) -> Result<(), String> {
    validate_signature(&rule.old_hook).map_err(|e| format!("oldHook: {}", e))?;
    if let Some(new_hook) = &rule.new_hook {
        validate_signature(new_hook).map_err(|e| format!("newHook: {}", e))?;
    }
    Ok(())
}

fn validate_signature(sig: &HookSignature) -> Result<(), String> {
    if sig.name.trim().is_empty() {
        return Err("hookName must not be empty".to_string());
    }
    if sig.name.contains(|c: char| c == '(' || c == ')' || c.is_whitespace()) {
        return Err(format!("hookName {:?} is not a bare identifier", sig.name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    const RULES: &str = r#"[
        {
            "oldHook": { "hookName": "OnTick", "hookParameters": ["int"] },
            "newHook": { "hookName": "OnUpdate", "hookParameters": ["int", "float"] }
        },
        {
            "oldHook": { "hookName": "OnLegacy", "hookParameters": [] },
            "newHook": null
        },
        {
            "oldHook": { "hookName": "OnRemoved", "hookParameters": ["string"] }
        }
    ]"#;

    #[test]
    fn test_load_and_lookup() {
        let registry = Registry::from_json_str(RULES, "test").unwrap();
        assert_eq!(registry.len(), 3);

        let rule = registry
            .lookup(&HookSignature::new("OnTick", ["int"]))
            .expect("OnTick(int) should be deprecated");
        assert_eq!(
            rule.new_hook,
            Some(HookSignature::new("OnUpdate", ["int", "float"]))
        );

        assert!(registry.lookup_canonical("OnLegacy()").is_some());
        assert!(registry.lookup_canonical("OnRemoved(string)").unwrap().new_hook.is_none());
        assert!(registry.lookup_canonical("OnTick(float)").is_none());
    }

    #[test]
    fn test_null_and_absent_new_hook_are_equivalent() {
        let registry = Registry::from_json_str(RULES, "test").unwrap();
        assert_eq!(registry.rules()[1].new_hook, None);
        assert_eq!(registry.rules()[2].new_hook, None);
    }

    #[test]
    fn test_missing_hook_name_is_rejected() {
        let json = r#"[{ "oldHook": { "hookParameters": ["int"] } }]"#;
        let err = Registry::from_json_str(json, "test").unwrap_err();
        assert!(matches!(err, RegistryLoadError::Json { .. }));
        assert!(err.to_string().contains("hookName"));
    }

    #[test]
    fn test_non_list_parameters_are_rejected() {
        let json = r#"[{ "oldHook": { "hookName": "OnTick", "hookParameters": "int" } }]"#;
        let err = Registry::from_json_str(json, "test").unwrap_err();
        assert!(matches!(err, RegistryLoadError::Json { .. }));
    }

    #[test]
    fn test_empty_hook_name_is_schema_error() {
        let json = r#"[
            { "oldHook": { "hookName": "Ok", "hookParameters": [] } },
            { "oldHook": { "hookName": "  ", "hookParameters": [] } }
        ]"#;
        match Registry::from_json_str(json, "test") {
            Err(RegistryLoadError::Schema { index, reason, .. }) => {
                assert_eq!(index, 1);
                assert!(reason.contains("oldHook"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let json = r#"[{ "oldHook": { "hookName": "A", "hookParameters": [] }, "nwHook": null }]"#;
        assert!(Registry::from_json_str(json, "test").is_err());
    }

    #[test]
    fn test_duplicate_first_wins() {
        let json = r#"[
            { "oldHook": { "hookName": "Foo", "hookParameters": ["int"] },
              "newHook": { "hookName": "First", "hookParameters": [] } },
            { "oldHook": { "hookName": "Foo", "hookParameters": ["int"] },
              "newHook": { "hookName": "Second", "hookParameters": [] } }
        ]"#;
        let registry = Registry::from_json_str(json, "test").unwrap();
        let rule = registry.lookup_canonical("Foo(int)").unwrap();
        assert_eq!(rule.new_hook.as_ref().unwrap().name, "First");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected_under_strict_policy() {
        let rules = vec![
            DeprecationRule::new(HookSignature::new("Foo", ["int"]), None),
            DeprecationRule::new(HookSignature::new("Foo", ["int"]), None),
        ];
        let err = Registry::with_policy(rules, "test", DuplicatePolicy::Reject).unwrap_err();
        match err {
            RegistryLoadError::DuplicateOldHook {
                signature,
                first,
                second,
                ..
            } => {
                assert_eq!(signature, "Foo(int)");
                assert_eq!((first, second), (0, 1));
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = Registry::load("/nonexistent/hooks.json").unwrap_err();
        assert!(matches!(err, RegistryLoadError::NotFound { .. }));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = temp_file(".yaml");
        writeln!(
            file,
            r#"
- oldHook:
    hookName: OnTick
    hookParameters: [int]
  newHook:
    hookName: OnUpdate
    hookParameters: [int, float]
"#
        )
        .unwrap();

        let registry = Registry::load(file.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup_canonical("OnTick(int)").is_some());
    }

    #[test]
    fn test_malformed_json_file() {
        let mut file = temp_file(".json");
        write!(file, "{{ not json").unwrap();
        let err = Registry::load(file.path()).unwrap_err();
        assert!(matches!(err, RegistryLoadError::Json { .. }));
    }

    #[test]
    fn test_bundled_rules_load() {
        let registry = Registry::bundled().unwrap();
        assert!(!registry.is_empty());
        assert_eq!(registry.origin(), BUNDLED_ORIGIN);
    }
}
