//! Rust language analyzer using tree-sitter.
//!
//! Extracts:
//! - Free functions
//! - Impl and trait methods (receiver = impl type or trait name)
//! - Trait method signatures without a body
//!
//! `self` receivers are not parameters for matching purposes.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::{collect_callables, enclosing, CallableCapture, CallableShape};
use crate::analysis::{CallableKind, FileFacts, LanguageAnalyzer, Parameter, ParsedFile};

/// Tree-sitter query for extracting Rust callables.
const DECLARATION_QUERY: &str = r#"
; Functions and methods with a body
(function_item
  name: (identifier) @func_name
) @function

; Trait items without a body
(function_signature_item
  name: (identifier) @sig_name
) @signature
"#;

const CAPTURES: &[CallableCapture] = &[
    CallableCapture {
        name: "func_name",
        node: "function",
        kind: CallableKind::Function,
    },
    CallableCapture {
        name: "sig_name",
        node: "signature",
        kind: CallableKind::Signature,
    },
];

/// Rust language analyzer.
pub struct RustAnalyzer {
    language: Language,
}

impl RustAnalyzer {
    /// Create a new Rust analyzer.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this thread.
    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn describe(&self, parsed: &ParsedFile, node: Node, kind: CallableKind) -> CallableShape {
        let owner = enclosing(node, &["impl_item", "trait_item"], &["function_item"]);

        let receiver = owner.and_then(|o| match o.kind() {
            "impl_item" => parsed.field_text(o, "type"),
            _ => parsed.field_text(o, "name"),
        });

        let kind = match (kind, owner) {
            (CallableKind::Function, Some(_)) => CallableKind::Method,
            (k, _) => k,
        };

        CallableShape {
            kind,
            receiver,
            parameters: self.extract_parameters(parsed, node),
        }
    }

    fn extract_parameters(&self, parsed: &ParsedFile, func: Node) -> Vec<Parameter> {
        let list = match func.child_by_field_name("parameters") {
            Some(n) => n,
            None => return Vec::new(),
        };

        let mut params = Vec::new();
        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            match child.kind() {
                "parameter" => params.push(Parameter {
                    name: parsed.field_text(child, "pattern"),
                    type_text: parsed.field_text(child, "type"),
                }),
                "variadic_parameter" => params.push(Parameter {
                    name: parsed.field_text(child, "pattern"),
                    type_text: Some("...".to_string()),
                }),
                "self_parameter" | "attribute_item" | "line_comment" | "block_comment" => {}
                // Bare types, as in 2015-edition trait items: `fn f(u32);`
                _ => params.push(Parameter {
                    name: None,
                    type_text: Some(parsed.node_text(child).to_string()),
                }),
            }
        }
        params
    }
}

impl Default for RustAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for RustAnalyzer {
    fn language_id(&self) -> &'static str {
        "rust"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Rust file: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        let mut facts = FileFacts::empty(&parsed.path, self.language_id());
        facts.has_parse_errors = parsed.tree.root_node().has_error();
        facts.callables = collect_callables(
            &self.language,
            DECLARATION_QUERY,
            CAPTURES,
            parsed,
            |node, kind| self.describe(parsed, node, kind),
        )?;
        Ok(facts)
    }
}
