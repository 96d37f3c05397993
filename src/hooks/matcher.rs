//! Matching declared callables against the deprecation registry.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;
use super::registry::Registry;
use super::signature::canonicalize_partial;

/// A callable declaration reported by a fact source.
///
/// `parameter_types` holds the literal type text of each parameter in
/// declaration order; `None` marks a parameter whose type is not written
/// out (an untyped Python argument, an implicitly typed lambda parameter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredCallable<L> {
    pub name: String,
    pub parameter_types: Vec<Option<String>>,
    pub location: L,
}

impl<L> DeclaredCallable<L> {
    pub fn new<N, I, S>(name: N, parameter_types: I, location: L) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(|t| Some(t.into())).collect(),
            location,
        }
    }

    /// A fact with no usable name can never match a rule.
    pub fn is_malformed(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Canonical `Name(T1, T2)` form of this callable.
    pub fn canonical_signature(&self) -> String {
        canonicalize_partial(&self.name, &self.parameter_types)
    }
}

/// Looks up declared callables in a registry and builds diagnostics.
///
/// Holds only a shared reference, so one matcher can serve many threads.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'r> {
    registry: &'r Registry,
}

impl<'r> Matcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Examine one fact; `None` when it matches no deprecated hook.
    pub fn examine<L: Clone>(&self, fact: &DeclaredCallable<L>) -> Option<Diagnostic<L>> {
        if fact.is_malformed() {
            tracing::debug!(
                parameters = fact.parameter_types.len(),
                "skipping declared callable without a name"
            );
            return None;
        }

        let signature = fact.canonical_signature();
        let rule = self.registry.lookup_canonical(&signature)?;
        let replacement = rule.new_hook.as_ref().map(|h| h.canonical());

        Some(Diagnostic::deprecated_hook(
            fact.location.clone(),
            signature,
            replacement,
        ))
    }

    /// Examine a stream of facts, keeping input order.
    pub fn examine_all<'a, L, I>(&self, facts: I) -> Vec<Diagnostic<L>>
    where
        L: Clone + 'a,
        I: IntoIterator<Item = &'a DeclaredCallable<L>>,
    {
        facts.into_iter().filter_map(|f| self.examine(f)).collect()
    }

    /// Examine facts in parallel. Output order matches input order.
    pub fn examine_par<L>(&self, facts: &[DeclaredCallable<L>]) -> Vec<Diagnostic<L>>
    where
        L: Clone + Send + Sync,
    {
        facts.par_iter().filter_map(|f| self.examine(f)).collect()
    }
}

/// Examine a single fact against a registry.
pub fn examine<L: Clone>(registry: &Registry, fact: &DeclaredCallable<L>) -> Option<Diagnostic<L>> {
    Matcher::new(registry).examine(fact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{DeprecationRule, DuplicatePolicy, HookSignature, Severity};

    fn registry() -> Registry {
        let rules = vec![
            DeprecationRule::new(
                HookSignature::new("OnTick", ["int"]),
                Some(HookSignature::new("OnUpdate", ["int", "float"])),
            ),
            DeprecationRule::new(HookSignature::new("OnLegacy", ["string"]), None),
            DeprecationRule::new(
                HookSignature::new("Foo", ["int", "float"]),
                Some(HookSignature::new("Foo2", ["int", "float"])),
            ),
            DeprecationRule::new(HookSignature::new("Bar", Vec::<String>::new()), None),
        ];
        Registry::with_policy(rules, "test", DuplicatePolicy::FirstWins).unwrap()
    }

    #[test]
    fn test_exact_match_fires() {
        let registry = registry();
        let fact = DeclaredCallable::new("OnTick", ["int"], "L");

        let diagnostic = examine(&registry, &fact).expect("should match");
        assert_eq!(
            diagnostic.message,
            "Hook \"OnTick(int)\" is deprecated. Use \"OnUpdate(int, float)\" instead."
        );
        assert_eq!(diagnostic.location, "L");
        assert_eq!(diagnostic.rule_id, "RUST0004");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(
            diagnostic.help_uri,
            "https://github.com/rust-analyzer/docs/RUST0004.md"
        );
        assert_eq!(diagnostic.deprecated, "OnTick(int)");
        assert_eq!(diagnostic.replacement.as_deref(), Some("OnUpdate(int, float)"));
    }

    #[test]
    fn test_no_replacement() {
        let registry = registry();
        let fact = DeclaredCallable::new("OnLegacy", ["string"], 1);
        let diagnostic = examine(&registry, &fact).unwrap();
        assert!(diagnostic.message.ends_with("Use \"no replacement\" instead."));
        assert_eq!(diagnostic.replacement, None);
    }

    #[test]
    fn test_parameter_order_matters() {
        let registry = registry();
        let fact = DeclaredCallable::new("Foo", ["float", "int"], ());
        assert!(examine(&registry, &fact).is_none());
    }

    #[test]
    fn test_no_match_no_output() {
        let registry = registry();
        let facts = vec![
            DeclaredCallable::new("OnTick", ["long"], 1),
            DeclaredCallable::new("Unrelated", Vec::<String>::new(), 2),
        ];
        assert!(Matcher::new(&registry).examine_all(&facts).is_empty());
    }

    #[test]
    fn test_empty_parameter_list() {
        let registry = registry();
        let fact = DeclaredCallable::new("Bar", Vec::<String>::new(), 3);
        assert_eq!(fact.canonical_signature(), "Bar()");
        let diagnostic = examine(&registry, &fact).unwrap();
        assert_eq!(diagnostic.deprecated, "Bar()");
    }

    #[test]
    fn test_unknown_parameter_type_is_empty_string() {
        let fact = DeclaredCallable {
            name: "Foo".to_string(),
            parameter_types: vec![None, Some("int".to_string())],
            location: (),
        };
        assert_eq!(fact.canonical_signature(), "Foo(, int)");
        assert!(examine(&registry(), &fact).is_none());
    }

    #[test]
    fn test_malformed_fact_never_matches() {
        let rules = vec![DeprecationRule::new(
            HookSignature::new("Bar", Vec::<String>::new()),
            None,
        )];
        let registry = Registry::with_policy(rules, "test", DuplicatePolicy::FirstWins).unwrap();
        let fact = DeclaredCallable::new("", Vec::<String>::new(), 0);
        assert!(fact.is_malformed());
        assert!(examine(&registry, &fact).is_none());
    }

    #[test]
    fn test_idempotent_ordered_output() {
        let registry = registry();
        let matcher = Matcher::new(&registry);
        let facts = vec![
            DeclaredCallable::new("Bar", Vec::<String>::new(), 1),
            DeclaredCallable::new("Nope", ["int"], 2),
            DeclaredCallable::new("OnTick", ["int"], 3),
            DeclaredCallable::new("OnLegacy", ["string"], 4),
        ];

        let first = matcher.examine_all(&facts);
        let second = matcher.examine_all(&facts);
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|d| d.location).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let registry = registry();
        let matcher = Matcher::new(&registry);
        let facts: Vec<_> = (0..500)
            .map(|i| {
                if i % 3 == 0 {
                    DeclaredCallable::new("OnTick", ["int"], i)
                } else {
                    DeclaredCallable::new("Other", ["int"], i)
                }
            })
            .collect();

        assert_eq!(matcher.examine_par(&facts), matcher.examine_all(&facts));
    }
}
