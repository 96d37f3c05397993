//! Fact structures extracted from AST analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hooks::DeclaredCallable;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Where a diagnostic points: a file relative to the scan root plus the
/// position of the callable's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    /// 1-indexed line.
    pub line: usize,
    /// 1-indexed column.
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Kind of callable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallableKind {
    /// Free function.
    Function,
    /// Function declared inside a type (class, impl block, receiver).
    Method,
    Constructor,
    /// Declaration without a body (trait item, interface member, abstract method).
    Signature,
}

impl CallableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallableKind::Function => "function",
            CallableKind::Method => "method",
            CallableKind::Constructor => "constructor",
            CallableKind::Signature => "signature",
        }
    }
}

impl fmt::Display for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Option<String>,
    /// Type exactly as written in the source, `None` when not written.
    pub type_text: Option<String>,
}

impl Parameter {
    pub fn typed(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_text: Some(type_text.into()),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_text: None,
        }
    }
}

/// A function, method or constructor found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableDeclaration {
    pub name: String,
    pub kind: CallableKind,
    /// Enclosing type or receiver (e.g. `Config` for `func (c *Config) Validate()`).
    pub receiver: Option<String>,
    pub parameters: Vec<Parameter>,
    /// Span of the name identifier.
    pub name_span: Span,
}

impl CallableDeclaration {
    /// Get the fully qualified name (receiver.name for methods).
    pub fn qualified_name(&self) -> String {
        if let Some(ref recv) = self.receiver {
            format!("{}.{}", recv, self.name)
        } else {
            self.name.clone()
        }
    }

    /// Parameter type texts in declaration order.
    pub fn parameter_types(&self) -> Vec<Option<String>> {
        self.parameters.iter().map(|p| p.type_text.clone()).collect()
    }
}

/// All facts extracted from a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFacts {
    /// File path.
    pub path: String,
    /// Language identifier.
    pub language: String,
    /// Callables in source order.
    pub callables: Vec<CallableDeclaration>,
    /// Whether the file had parse errors.
    pub has_parse_errors: bool,
    /// Whether the file was produced by a code generator.
    #[serde(default)]
    pub generated: bool,
}

impl FileFacts {
    /// Create empty facts for a file.
    pub fn empty(path: &str, language: &str) -> Self {
        Self {
            path: path.to_string(),
            language: language.to_string(),
            callables: Vec::new(),
            has_parse_errors: false,
            generated: false,
        }
    }

    /// Find a callable by name.
    pub fn find_callable(&self, name: &str) -> Option<&CallableDeclaration> {
        self.callables.iter().find(|c| c.name == name)
    }

    /// Turn every callable into a fact for the hook matcher.
    pub fn declared_callables(&self) -> impl Iterator<Item = DeclaredCallable<SourceLocation>> + '_ {
        self.callables.iter().map(move |c| DeclaredCallable {
            name: c.name.clone(),
            parameter_types: c.parameter_types(),
            location: SourceLocation::new(
                self.path.clone(),
                c.name_span.start_line,
                c.name_span.start_col,
            ),
        })
    }
}
