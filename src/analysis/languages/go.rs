//! Go language analyzer using tree-sitter.
//!
//! `func f(a, b int)` declares two parameters of type `int`, so grouped
//! names repeat the shared type once per name.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::{collect_callables, CallableCapture, CallableShape};
use crate::analysis::{CallableKind, FileFacts, LanguageAnalyzer, Parameter, ParsedFile};

/// Tree-sitter query for extracting Go callables.
const DECLARATION_QUERY: &str = r#"
; Function declarations: func Name(...)
(function_declaration
  name: (identifier) @func_name
) @function

; Method declarations: func (r *Type) Name(...)
(method_declaration
  name: (field_identifier) @method_name
) @method
"#;

const CAPTURES: &[CallableCapture] = &[
    CallableCapture {
        name: "func_name",
        node: "function",
        kind: CallableKind::Function,
    },
    CallableCapture {
        name: "method_name",
        node: "method",
        kind: CallableKind::Method,
    },
];

/// Go language analyzer.
pub struct GoAnalyzer {
    language: Language,
}

impl GoAnalyzer {
    /// Create a new Go analyzer.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this thread.
    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn describe(&self, parsed: &ParsedFile, node: Node, kind: CallableKind) -> CallableShape {
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| self.extract_parameters(parsed, list).into_iter().next())
            .and_then(|p| p.type_text)
            .map(|t| receiver_type_name(&t).to_string());

        let parameters = node
            .child_by_field_name("parameters")
            .map(|list| self.extract_parameters(parsed, list))
            .unwrap_or_default();

        CallableShape {
            kind,
            receiver,
            parameters,
        }
    }

    fn extract_parameters(&self, parsed: &ParsedFile, list: Node) -> Vec<Parameter> {
        let mut params = Vec::new();
        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            let variadic = match child.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };

            let type_text = parsed.field_text(child, "type").map(|t| {
                if variadic {
                    format!("...{}", t)
                } else {
                    t
                }
            });

            let mut names_cursor = child.walk();
            let names: Vec<String> = child
                .children_by_field_name("name", &mut names_cursor)
                .map(|n| parsed.node_text(n).to_string())
                .collect();

            if names.is_empty() {
                params.push(Parameter {
                    name: None,
                    type_text,
                });
            } else {
                for name in names {
                    params.push(Parameter {
                        name: Some(name),
                        type_text: type_text.clone(),
                    });
                }
            }
        }
        params
    }
}

/// `*Server` or `Server[T]` -> `Server`
fn receiver_type_name(type_text: &str) -> &str {
    let trimmed = type_text.trim_start_matches('*');
    trimmed.split('[').next().unwrap_or(trimmed)
}

impl Default for GoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for GoAnalyzer {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Go file: {}", path.display()))?;

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
