//! Language-specific analyzer implementations.

mod csharp;
mod go;
mod java;
mod python;
mod rust_lang;
mod typescript;

pub use csharp::CSharpAnalyzer;
pub use go::GoAnalyzer;
pub use java::JavaAnalyzer;
pub use python::PythonAnalyzer;
pub use rust_lang::RustAnalyzer;
pub use typescript::TypeScriptAnalyzer;

use once_cell::sync::OnceCell;
use std::collections::HashSet;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Query, QueryCursor};

use super::{CallableDeclaration, CallableKind, LanguageAnalyzer, Parameter, ParsedFile, Span};

/// Static storage for C# analyzer.
static CSHARP_ANALYZER: OnceCell<CSharpAnalyzer> = OnceCell::new();

/// Static storage for Go analyzer.
static GO_ANALYZER: OnceCell<GoAnalyzer> = OnceCell::new();

/// Static storage for Java analyzer.
static JAVA_ANALYZER: OnceCell<JavaAnalyzer> = OnceCell::new();

/// Static storage for Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Static storage for Rust analyzer.
static RUST_ANALYZER: OnceCell<RustAnalyzer> = OnceCell::new();

/// Static storage for TypeScript analyzer.
static TYPESCRIPT_ANALYZER: OnceCell<TypeScriptAnalyzer> = OnceCell::new();

/// Language identifiers accepted in configuration files.
pub const LANGUAGE_IDS: &[&str] = &["csharp", "go", "java", "python", "rust", "typescript"];

/// Register all available language analyzers.
///
/// This is idempotent. Concurrent callers block until every analyzer exists.
pub fn register_analyzers() {
    CSHARP_ANALYZER.get_or_init(CSharpAnalyzer::new);
    GO_ANALYZER.get_or_init(GoAnalyzer::new);
    JAVA_ANALYZER.get_or_init(JavaAnalyzer::new);
    PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new);
    RUST_ANALYZER.get_or_init(RustAnalyzer::new);
    TYPESCRIPT_ANALYZER.get_or_init(TypeScriptAnalyzer::new);
}

/// Get an analyzer for the given file extension.
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    match ext {
        "cs" => get_analyzer_by_id("csharp"),
        "go" => get_analyzer_by_id("go"),
        "java" => get_analyzer_by_id("java"),
        "py" | "pyi" => get_analyzer_by_id("python"),
        "rs" => get_analyzer_by_id("rust"),
        "ts" | "tsx" | "mts" | "cts" => get_analyzer_by_id("typescript"),
        _ => None,
    }
}

/// Get an analyzer by language ID.
///
/// Analyzers are built on first use, so lookups are safe from any thread
/// whether or not [`register_analyzers`] has run.
pub fn get_analyzer_by_id(lang_id: &str) -> Option<&'static dyn LanguageAnalyzer> {
    let analyzer: &'static dyn LanguageAnalyzer = match lang_id {
        "csharp" => CSHARP_ANALYZER.get_or_init(CSharpAnalyzer::new),
        "go" => GO_ANALYZER.get_or_init(GoAnalyzer::new),
        "java" => JAVA_ANALYZER.get_or_init(JavaAnalyzer::new),
        "python" => PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new),
        "rust" => RUST_ANALYZER.get_or_init(RustAnalyzer::new),
        "typescript" => TYPESCRIPT_ANALYZER.get_or_init(TypeScriptAnalyzer::new),
        _ => return None,
    };
    Some(analyzer)
}

/// All file extensions some analyzer handles.
pub fn registered_extensions() -> Vec<&'static str> {
    LANGUAGE_IDS
        .iter()
        .filter_map(|id| get_analyzer_by_id(id))
        .flat_map(|a| a.file_extensions().iter().copied())
        .collect()
}

/// Maps a pair of query captures to a callable kind.
pub(crate) struct CallableCapture {
    /// Capture holding the name identifier.
    pub name: &'static str,
    /// Capture holding the whole declaration.
    pub node: &'static str,
    pub kind: CallableKind,
}

/// What a language reports about one declaration node.
pub(crate) struct CallableShape {
    pub kind: CallableKind,
    pub receiver: Option<String>,
    pub parameters: Vec<Parameter>,
}

/// Run a declaration query and build a callable for each match.
///
/// `describe` receives the declaration node and the kind implied by the
/// capture, and returns the final kind, receiver and parameters. Results are
/// sorted by name position.
pub(crate) fn collect_callables<F>(
    language: &Language,
    query_source: &str,
    captures: &[CallableCapture],
    parsed: &ParsedFile,
    mut describe: F,
) -> anyhow::Result<Vec<CallableDeclaration>>
where
    F: FnMut(Node, CallableKind) -> CallableShape,
{
    let query = Query::new(language, query_source)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

    let mut callables = Vec::new();
    let mut seen_positions = HashSet::new();

    while let Some(m) = matches.next() {
        for spec in captures {
            let mut name_node = None;
            let mut decl_node = None;

            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                if capture_name == spec.name {
                    name_node = Some(capture.node);
                } else if capture_name == spec.node {
                    decl_node = Some(capture.node);
                }
            }

            let (Some(name_node), Some(decl_node)) = (name_node, decl_node) else {
                continue;
            };

            let name = parsed.node_text(name_node).to_string();
            if name.is_empty() || !seen_positions.insert(name_node.start_byte()) {
                continue;
            }

            let shape = describe(decl_node, spec.kind);
            callables.push(CallableDeclaration {
                name,
                kind: shape.kind,
                receiver: shape.receiver,
                parameters: shape.parameters,
                name_span: Span::from_node(name_node),
            });
        }
    }

    // Sort by position for deterministic output
    callables.sort_by_key(|c| c.name_span.start_byte);

    Ok(callables)
}

/// Walk up from `node` to the nearest ancestor whose kind is in `kinds`.
///
/// Stops (returning `None`) at any ancestor whose kind is in `barriers`,
/// so a nested function does not inherit the outer type.
pub(crate) fn enclosing<'a>(node: Node<'a>, kinds: &[&str], barriers: &[&str]) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return Some(n);
        }
        if barriers.contains(&n.kind()) {
            return None;
        }
        current = n.parent();
    }
    None
}
