//! Hook signatures and their canonical string form.
//!
//! The canonical form is the lookup key shared by rule files and declared
//! callables: `Name(Type1, Type2)`. It must stay bit-exact, so every caller
//! goes through [`canonicalize`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator placed between parameter types in a canonical signature.
pub const PARAMETER_SEPARATOR: &str = ", ";

/// A hook name together with its ordered parameter types.
///
/// Parameter types are literal text: `List<int>` and `List< int >` are
/// different signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookSignature {
    #[serde(rename = "hookName")]
    pub name: String,
    #[serde(rename = "hookParameters")]
    pub parameter_types: Vec<String>,
}

impl HookSignature {
    pub fn new<N, I, S>(name: N, parameter_types: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
        }
    }

    /// The canonical `Name(T1, T2)` string used as the registry key.
    pub fn canonical(&self) -> String {
        canonicalize(&self.name, self.parameter_types.iter().map(String::as_str))
    }
}

impl fmt::Display for HookSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Build the canonical signature string for a name and parameter types.
pub fn canonicalize<'a, I>(name: &str, parameter_types: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = parameter_types
        .into_iter()
        .collect::<Vec<_>>()
        .join(PARAMETER_SEPARATOR);
    format!("{}({})", name, joined)
}

/// Canonicalize parameters whose type text may be unknown.
///
/// Unknown types contribute an empty string, so `Foo(a, b)` with an
/// untyped first parameter becomes `Foo(, int)`.
pub fn canonicalize_partial(name: &str, parameter_types: &[Option<String>]) -> String {
    canonicalize(
        name,
        parameter_types.iter().map(|t| t.as_deref().unwrap_or("")),
    )
}
