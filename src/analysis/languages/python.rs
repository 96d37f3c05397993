//! Python language analyzer using tree-sitter.
//!
//! Parameter types come from annotations. Unannotated parameters have no
//! type, and the implicit `self`/`cls` of a method is dropped.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::{collect_callables, enclosing, CallableCapture, CallableShape};
use crate::analysis::{CallableKind, FileFacts, LanguageAnalyzer, Parameter, ParsedFile};

const DECLARATION_QUERY: &str = r#"
(function_definition
  name: (identifier) @func_name
) @function
"#;

const CAPTURES: &[CallableCapture] = &[CallableCapture {
    name: "func_name",
    node: "function",
    kind: CallableKind::Function,
}];

pub struct PythonAnalyzer {
    language: Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    fn describe(&self, parsed: &ParsedFile, node: Node, kind: CallableKind) -> CallableShape {
        let class = enclosing(node, &["class_definition"], &["function_definition"]);
        let receiver = class.and_then(|c| parsed.field_text(c, "name"));

        let mut parameters = self.extract_parameters(parsed, node);
        if receiver.is_some() {
            let implicit_first = parameters.first().is_some_and(|p| {
                p.type_text.is_none() && matches!(p.name.as_deref(), Some("self") | Some("cls"))
            });
            if implicit_first {
                parameters.remove(0);
            }
        }

        CallableShape {
            kind: if receiver.is_some() {
                CallableKind::Method
            } else {
                kind
            },
            receiver,
            parameters,
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
            let param = match child.kind() {
                "identifier" => Parameter::untyped(parsed.node_text(child)),
                "default_parameter" => Parameter {
                    name: parsed.field_text(child, "name"),
                    type_text: None,
                },
                "typed_default_parameter" => Parameter {
                    name: parsed.field_text(child, "name"),
                    type_text: parsed.field_text(child, "type"),
                },
                // `x: int`, `*args: int`, `**kw: Any`; the name is the first child
                "typed_parameter" => Parameter {
                    name: child.named_child(0).map(|n| parsed.node_text(n).to_string()),
                    type_text: parsed.field_text(child, "type"),
                },
                "list_splat_pattern" | "dictionary_splat_pattern" => Parameter {
                    name: Some(parsed.node_text(child).to_string()),
                    type_text: None,
                },
                // `*` and `/` separators
                _ => continue,
            };
            params.push(param);
        }
        params
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Python file: {}", path.display()))?;

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

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(source: &str) -> FileFacts {
        let analyzer = PythonAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("plugin.py"), source.as_bytes())
            .unwrap();
        analyzer.extract_facts(&parsed).unwrap()
    }

    #[test]
    fn test_annotated_and_plain_parameters() {
        let facts = analyze(
            r#"
def on_tick(tick: int, label, scale: float = 1.0, retries=3):
    pass
"#,
        );

        assert_eq!(facts.callables.len(), 1);
        assert_eq!(
            facts.callables[0].parameter_types(),
            vec![
                Some("int".to_string()),
                None,
                Some("float".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_method_drops_self() {
        let facts = analyze(
            r#"
class Plugin:
    def on_player_init(self, player: BasePlayer):
        pass

    @classmethod
    def create(cls):
        return cls()
"#,
        );

        assert_eq!(facts.callables.len(), 2);
        let init = &facts.callables[0];
        assert_eq!(init.kind, CallableKind::Method);
        assert_eq!(init.receiver.as_deref(), Some("Plugin"));
        assert_eq!(init.parameter_types(), vec![Some("BasePlayer".to_string())]);

        assert!(facts.callables[1].parameters.is_empty());
    }

    #[test]
    fn test_splats_and_separators() {
        let facts = analyze("def hook(a: int, *args, key: str, **kwargs):\n    pass\n");
        let hook = &facts.callables[0];
        assert_eq!(hook.parameters.len(), 4);
        assert_eq!(
            hook.parameter_types(),
            vec![Some("int".to_string()), None, Some("str".to_string()), None]
        );
    }

    #[test]
    fn test_nested_function_in_method_is_a_function() {
        let facts = analyze(
            r#"
class Plugin:
    def outer(self):
        def inner(self, x: int):
            pass
"#,
        );
        let inner = facts.find_callable("inner").unwrap();
        assert_eq!(inner.kind, CallableKind::Function);
        assert_eq!(inner.parameters.len(), 2);
    }
}
