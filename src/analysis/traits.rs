//! Core traits for language analysis.

use std::path::Path;

use super::FileFacts;

/// Holds a parsed tree-sitter tree and associated metadata.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Text of a named field of `node`, if the field is present.
    pub fn field_text(&self, node: tree_sitter::Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.node_text(n).to_string())
    }
}

/// Language-specific fact source.
///
/// Each language implements this trait to list the callables declared in a
/// file together with the literal type text of their parameters.
///
/// # Thread Safety
///
/// Note: tree_sitter::Parser is not Sync, so implementations should
/// create parsers as needed or use thread-local storage.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "csharp", "rust").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Returns an error if parsing fails completely (e.g., wrong language).
    /// Partial parse errors are still returned as a valid tree with ERROR nodes.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile>;

    /// Extract the callable declarations of a parsed file.
    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
