//! C# language analyzer using tree-sitter.
//!
//! Only method declarations are reported. Constructors, local functions and
//! lambdas are not hook candidates.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use super::{collect_callables, enclosing, CallableCapture, CallableShape};
use crate::analysis::{CallableKind, FileFacts, LanguageAnalyzer, Parameter, ParsedFile};

const DECLARATION_QUERY: &str = r#"
(method_declaration
  name: (identifier) @method_name
) @method
"#;

const CAPTURES: &[CallableCapture] = &[CallableCapture {
    name: "method_name",
    node: "method",
    kind: CallableKind::Method,
}];

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
];

pub struct CSharpAnalyzer {
    language: Language,
}

impl CSharpAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_c_sharp::LANGUAGE.into(),
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

        let kind = if node.child_by_field_name("body").is_none() && receiver.is_some() {
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
                "parameter" => params.push(Parameter {
                    name: parsed.field_text(child, "name"),
                    type_text: parsed.field_text(child, "type"),
                }),
                // Older grammars model `params T[] xs` separately.
                "parameter_array" => {
                    let mut inner = child.walk();
                    let type_text = child
                        .named_children(&mut inner)
                        .find(|n| !matches!(n.kind(), "attribute_list" | "identifier"))
                        .map(|n| parsed.node_text(n).to_string());
                    params.push(Parameter {
                        name: parsed.field_text(child, "name"),
                        type_text,
                    });
                }
                _ => {}
            }
        }
        params
    }
}

impl Default for CSharpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for CSharpAnalyzer {
    fn language_id(&self) -> &'static str {
        "csharp"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse C# file: {}", path.display()))?;

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
        let analyzer = CSharpAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("Plugin.cs"), source.as_bytes())
            .unwrap();
        analyzer.extract_facts(&parsed).unwrap()
    }

    #[test]
    fn test_method_parameter_types() {
        let facts = analyze(
            r#"
namespace Oxide.Plugins
{
    public class Greeter : RustPlugin
    {
        void OnPlayerDie(BasePlayer player, HitInfo info)
        {
            Puts("died");
        }

        private object CanLoot(BasePlayer player, List<Item> items, int count = 3) => null;
    }
}
"#,
        );

        assert_eq!(facts.language, "csharp");
        assert_eq!(facts.callables.len(), 2);

        let die = &facts.callables[0];
        assert_eq!(die.name, "OnPlayerDie");
        assert_eq!(die.receiver.as_deref(), Some("Greeter"));
        assert_eq!(die.kind, CallableKind::Method);
        assert_eq!(
            die.parameter_types(),
            vec![Some("BasePlayer".to_string()), Some("HitInfo".to_string())]
        );
        assert_eq!(die.name_span.start_line, 6);

        let loot = &facts.callables[1];
        assert_eq!(
            loot.parameter_types(),
            vec![
                Some("BasePlayer".to_string()),
                Some("List<Item>".to_string()),
                Some("int".to_string()),
            ]
        );
    }

    #[test]
    fn test_modifiers_are_not_part_of_type() {
        let facts = analyze(
            r#"
class C
{
    void OnMove(ref Vector3 position, out bool handled) { handled = false; }
}
"#,
        );
        assert_eq!(
            facts.callables[0].parameter_types(),
            vec![Some("Vector3".to_string()), Some("bool".to_string())]
        );
    }

    #[test]
    fn test_empty_parameter_list_and_constructor_ignored() {
        let facts = analyze(
            r#"
class C
{
    C() {}
    void OnServerInitialized() {}
}
"#,
        );
        assert_eq!(facts.callables.len(), 1);
        assert_eq!(facts.callables[0].name, "OnServerInitialized");
        assert!(facts.callables[0].parameters.is_empty());
    }

    #[test]
    fn test_interface_method_is_signature() {
        let facts = analyze("interface IHooks { void OnTick(int tick); }");
        assert_eq!(facts.callables[0].kind, CallableKind::Signature);
        assert_eq!(facts.callables[0].receiver.as_deref(), Some("IHooks"));
    }
}
