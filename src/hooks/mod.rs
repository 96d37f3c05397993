//! Deprecated-hook matching engine.
//!
//! This module has no knowledge of files or parsers. A host loads a
//! [`Registry`], wraps it in a [`Matcher`] and pushes [`DeclaredCallable`]
//! facts through it, collecting a [`Diagnostic`] for each deprecated hook.
//!
//! ```
//! use hookcheck::hooks::{DeclaredCallable, Matcher, Registry};
//!
//! let registry = Registry::from_json_str(
//!     r#"[{"oldHook": {"hookName": "OnTick", "hookParameters": ["int"]}, "newHook": null}]"#,
//!     "inline",
//! )
//! .unwrap();
//! let matcher = Matcher::new(&registry);
//!
//! let fact = DeclaredCallable::new("OnTick", ["int"], "Plugin.cs:12");
//! let diagnostic = matcher.examine(&fact).unwrap();
//! assert_eq!(
//!     diagnostic.message,
//!     "Hook \"OnTick(int)\" is deprecated. Use \"no replacement\" instead."
//! );
//! ```

mod diagnostic;
mod matcher;
mod registry;
mod signature;

pub use diagnostic::{
    format_message, help_uri, Diagnostic, Severity, CATEGORY, DESCRIPTION, HELP_URI_BASE,
    MESSAGE_FORMAT, NO_REPLACEMENT, RULE_ID, TITLE,
};
pub use matcher::{examine, DeclaredCallable, Matcher};
pub use registry::{DeprecationRule, DuplicatePolicy, Registry, RegistryLoadError, BUNDLED_ORIGIN};
pub use signature::{canonicalize, canonicalize_partial, HookSignature, PARAMETER_SEPARATOR};
