//! Java language analyzer using tree-sitter.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::{collect_callables, enclosing, CallableCapture, CallableShape};
use crate::analysis::{CallableKind, FileFacts, LanguageAnalyzer, Parameter, ParsedFile};

const DECLARATION_QUERY: &str = r#"
; Method declarations
(method_declaration
  name: (identifier) @method_name
) @method

; Constructor declarations
(constructor_declaration
  name: (identifier) @constructor_name
) @constructor
"#;

const CAPTURES: &[CallableCapture] = &[
    CallableCapture {
        name: "method_name",
        node: "method",
        kind: CallableKind::Method,
    },
    CallableCapture {
        name: "constructor_name",
        node: "constructor",
        kind: CallableKind::Constructor,
    },
];

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
];

pub struct JavaAnalyzer {
    language: Language,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn describe(&self, parsed: &ParsedFile, node: Node, kind: CallableKind) -> CallableShape {
        let receiver = enclosing(node, TYPE_DECLARATIONS, &[])
            .and_then(|t| parsed.field_text(t, "name"));

        let kind = if kind == CallableKind::Method && node.child_by_field_name("body").is_none() {
            CallableKind::Signature
        } else {
            kind
        };

        CallableShape {
            kind,
            receiver,
            parameters: self.extract_parameters(parsed, node),
        }
    }

    fn extract_parameters(&self, parsed: &ParsedFile, method: Node) -> Vec<Parameter> {
        let list = match method.child_by_field_name("parameters") {
            Some(n) => n,
            None => return Vec::new(),
        };

        let mut params = Vec::new();
        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            match child.kind() {
                "formal_parameter" => {
                    // `int values[]` puts the dimensions after the name
                    let type_text = parsed.field_text(child, "type").map(|t| {
                        match parsed.field_text(child, "dimensions") {
                            Some(dims) => format!("{}{}", t, dims),
                            None => t,
                        }
                    });
                    params.push(Parameter {
                        name: parsed.field_text(child, "name"),
                        type_text,
                    });
                }
                "spread_parameter" => {
                    let mut inner = child.walk();
                    let mut type_text = None;
                    let mut name = None;
                    for part in child.named_children(&mut inner) {
                        match part.kind() {
                            "modifiers" => {}
                            "variable_declarator" => name = parsed.field_text(part, "name"),
                            _ if type_text.is_none() => {
                                type_text = Some(format!("{}...", parsed.node_text(part)));
                            }
                            _ => {}
                        }
                    }
                    params.push(Parameter { name, type_text });
                }
                // `Foo this` receiver parameters are not part of the signature
                _ => {}
            }
        }
        params
    }
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Java file: {}", path.display()))?;

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
