//! Tree-sitter fact sources.
//!
//! This module turns source files into the declared-callable facts the
//! hook matcher consumes. For every function, method or signature it
//! records the name, the literal type text of each parameter and the
//! position of the name identifier.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ Analyzers    │────▶│ FileFacts     │
//! └─────────────────┘     │ (C#, Rust..) │     │ (Callables)   │
//!                         └──────────────┘     └───────────────┘
//!                                                      │
//!                                                      ▼
//!                         ┌──────────────┐     ┌───────────────┐
//!                         │ hooks::      │◀────│AnalysisContext│
//!                         │ Matcher      │     │ (Batch Facts) │
//!                         └──────────────┘     └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/` (e.g., `kotlin.rs`)
//! 2. Implement `LanguageAnalyzer` trait
//! 3. Define a tree-sitter query for callable declarations
//! 4. Register the analyzer in `languages/mod.rs`
//!
//! See `languages/csharp.rs` for a reference implementation.

mod context;
mod facts;
mod generated;
mod languages;
mod traits;

pub use context::AnalysisContext;
pub use facts::{
    CallableDeclaration, CallableKind, FileFacts, Parameter, SourceLocation, Span,
};
pub use languages::{
    get_analyzer, get_analyzer_by_id, register_analyzers, registered_extensions,
    CSharpAnalyzer, GoAnalyzer, JavaAnalyzer, PythonAnalyzer, RustAnalyzer,
    TypeScriptAnalyzer, LANGUAGE_IDS,
};
pub use generated::{has_generated_header, is_generated, is_generated_file_name};
pub use traits::{LanguageAnalyzer, ParsedFile};
