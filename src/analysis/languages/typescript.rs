//! TypeScript language analyzer using tree-sitter.
//!
//! `.tsx` files are parsed with the TSX grammar, everything else with the
//! plain TypeScript grammar. Parameter types are the annotation text without
//! the leading colon; unannotated parameters have no type.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::{collect_callables, enclosing, CallableCapture, CallableShape};
use crate::analysis::{CallableKind, FileFacts, LanguageAnalyzer, Parameter, ParsedFile};

const DECLARATION_QUERY: &str = r#"
; function foo(a: number) {}
(function_declaration
  name: (identifier) @func_name
) @function

; function* gen(a: number) {}
(generator_function_declaration
  name: (identifier) @gen_name
) @generator

; Overload signatures: function foo(a: number): void;
(function_signature
  name: (identifier) @overload_name
) @overload

; Class methods
(method_definition
  name: (property_identifier) @method_name
) @method

; Interface members
(method_signature
  name: (property_identifier) @member_name
) @member

; abstract onTick(): void;
(abstract_method_signature
  name: (property_identifier) @abstract_name
) @abstract
"#;

const CAPTURES: &[CallableCapture] = &[
    CallableCapture {
        name: "func_name",
        node: "function",
        kind: CallableKind::Function,
    },
    CallableCapture {
        name: "gen_name",
        node: "generator",
        kind: CallableKind::Function,
    },
    CallableCapture {
        name: "overload_name",
        node: "overload",
        kind: CallableKind::Signature,
    },
    CallableCapture {
        name: "method_name",
        node: "method",
        kind: CallableKind::Method,
    },
    CallableCapture {
        name: "member_name",
        node: "member",
        kind: CallableKind::Signature,
    },
    CallableCapture {
        name: "abstract_name",
        node: "abstract",
        kind: CallableKind::Signature,
    },
];

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "abstract_class_declaration",
    "class",
    "interface_declaration",
];

const FUNCTION_BARRIERS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "arrow_function",
    "function_expression",
];

pub struct TypeScriptAnalyzer {
    typescript: Language,
    tsx: Language,
}

impl TypeScriptAnalyzer {
    pub fn new() -> Self {
        Self {
            typescript: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tsx: tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn language_for(&self, path: &str) -> &Language {
        if path.ends_with(".tsx") {
            &self.tsx
        } else {
            &self.typescript
        }
    }

    fn create_parser(&self, language: &Language) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(parser)
    }

    fn describe(&self, parsed: &ParsedFile, node: Node, kind: CallableKind) -> CallableShape {
        let receiver = enclosing(node, TYPE_DECLARATIONS, FUNCTION_BARRIERS)
            .and_then(|t| parsed.field_text(t, "name"));

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
            if !matches!(child.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }

            let name = parsed.field_text(child, "pattern");
            // `this: Window` only types the receiver
            if name.as_deref() == Some("this") {
                continue;
            }

            let type_text = parsed
                .field_text(child, "type")
                .map(|annotation| strip_annotation(&annotation).to_string());

            params.push(Parameter { name, type_text });
        }
        params
    }
}

/// `": number"` -> `"number"`
fn strip_annotation(annotation: &str) -> &str {
    annotation.trim_start().trim_start_matches(':').trim()
}

impl Default for TypeScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for TypeScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "typescript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "mts", "cts"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let path_str = path.to_string_lossy().to_string();
        let mut parser = self.create_parser(self.language_for(&path_str))?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            anyhow::anyhow!("failed to parse TypeScript file: {}", path.display())
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path_str,
        })
    }

    fn extract_facts(&self, parsed: &ParsedFile) -> anyhow::Result<FileFacts> {
        let mut facts = FileFacts::empty(&parsed.path, self.language_id());
        facts.has_parse_errors = parsed.tree.root_node().has_error();
        facts.callables = collect_callables(
            self.language_for(&parsed.path),
            DECLARATION_QUERY,
            CAPTURES,
            parsed,
            |node, kind| self.describe(parsed, node, kind),
        )?;
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(path: &str, source: &str) -> FileFacts {
        let analyzer = TypeScriptAnalyzer::new();
        let parsed = analyzer.parse(Path::new(path), source.as_bytes()).unwrap();
        analyzer.extract_facts(&parsed).unwrap()
    }

    #[test]
    fn test_strip_annotation() {
        assert_eq!(strip_annotation(": number"), "number");
        assert_eq!(strip_annotation(":Map<string, number>"), "Map<string, number>");
    }

    #[test]
    fn test_function_and_method_parameters() {
        let facts = analyze(
            "plugin.ts",
            r#"
export function onTick(tick: number, label?: string) {}

class Plugin {
    onPlayerInit(player: BasePlayer, extra) {
        return player;
    }
}
"#,
        );

        assert_eq!(facts.callables.len(), 2);

        let tick = &facts.callables[0];
        assert_eq!(tick.kind, CallableKind::Function);
        assert_eq!(
            tick.parameter_types(),
            vec![Some("number".to_string()), Some("string".to_string())]
        );

        let init = &facts.callables[1];
        assert_eq!(init.kind, CallableKind::Method);
        assert_eq!(init.receiver.as_deref(), Some("Plugin"));
        assert_eq!(
            init.parameter_types(),
            vec![Some("BasePlayer".to_string()), None]
        );
    }

    #[test]
    fn test_interface_member_signature() {
        let facts = analyze(
            "hooks.ts",
            "interface Hooks { onTick(tick: number): void; }",
        );
        assert_eq!(facts.callables.len(), 1);
        assert_eq!(facts.callables[0].kind, CallableKind::Signature);
        assert_eq!(facts.callables[0].receiver.as_deref(), Some("Hooks"));
    }

    #[test]
    fn test_tsx_grammar() {
        let facts = analyze(
            "view.tsx",
            r#"
function render(props: Props) {
    return <div>{props.title}</div>;
}
"#,
        );
        assert_eq!(facts.callables.len(), 1);
        assert_eq!(
            facts.callables[0].parameter_types(),
            vec![Some("Props".to_string())]
        );
    }
}
