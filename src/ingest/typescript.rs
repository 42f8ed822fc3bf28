//! Declaration extraction from TypeScript syntax trees.
//!
//! The walk uses an explicit work stack, so deeply nested or malformed
//! input cannot exhaust the call stack. Declaration nodes are consumed
//! whole: nothing inside a class, interface or function is re-matched.
//! Namespaces add a scope segment and are walked through.

use std::collections::HashSet;
use tree_sitter::Node;

use super::{
    qualify, ClassDeclaration, Declaration, DeclarationKind, FunctionDeclaration,
    InterfaceDeclaration, MemberDeclaration,
};
use crate::record::MemberKind;

struct Frame<'tree> {
    node: Node<'tree>,
    scope: usize,
}

/// Declaration as read from the tree, before heritage names are resolved.
struct RawDeclaration {
    kind: DeclarationKind,
    scope: usize,
    name: String,
    start: usize,
    base_class: Option<String>,
    heritage: Vec<String>,
    members: Vec<MemberDeclaration>,
}

/// Collect every class, interface and function declaration under `root`,
/// in document order.
pub fn collect_declarations(root: Node<'_>, source: &[u8]) -> Vec<Declaration> {
    // scopes[0] is the file scope
    let mut scopes: Vec<Vec<String>> = vec![Vec::new()];
    let mut raw = Vec::new();
    let mut stack = vec![Frame {
        node: root,
        scope: 0,
    }];

    while let Some(Frame { node, scope }) = stack.pop() {
        match node.kind() {
            "class_declaration" | "abstract_class_declaration" => {
                raw.extend(read_class(node, source, scope));
                continue;
            }
            "interface_declaration" => {
                raw.extend(read_interface(node, source, scope));
                continue;
            }
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                raw.extend(read_function(node, source, scope));
                continue;
            }
            "internal_module" | "module" => {
                let inner = match namespace_segments(node, source) {
                    Some(segments) => {
                        let mut path = scopes[scope].clone();
                        path.extend(segments);
                        scopes.push(path);
                        scopes.len() - 1
                    }
                    None => scope,
                };
                if let Some(body) = node.child_by_field_name("body") {
                    stack.push(Frame {
                        node: body,
                        scope: inner,
                    });
                }
                continue;
            }
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push(Frame { node: child, scope });
        }
    }

    resolve(raw, &scopes)
}

/// Qualify names and resolve heritage references against the class-like
/// declarations of this file.
fn resolve(raw: Vec<RawDeclaration>, scopes: &[Vec<String>]) -> Vec<Declaration> {
    let declared: HashSet<String> = raw
        .iter()
        .filter(|d| d.kind != DeclarationKind::Function)
        .map(|d| qualify(&scopes[d.scope], &d.name))
        .collect();

    let resolve_name = |scope: &[String], name: &str| -> String {
        for depth in (1..=scope.len()).rev() {
            let candidate = qualify(&scope[..depth], name);
            if declared.contains(&candidate) {
                return candidate;
            }
        }
        name.to_string()
    };

    raw.into_iter()
        .map(|d| {
            let scope = &scopes[d.scope];
            let fqn = qualify(scope, &d.name);
            match d.kind {
                DeclarationKind::Class => Declaration::Class(ClassDeclaration {
                    fqn,
                    start: d.start,
                    base_class: d.base_class.map(|name| resolve_name(scope, &name)),
                    interfaces: d.heritage.iter().map(|n| resolve_name(scope, n)).collect(),
                    members: d.members,
                }),
                DeclarationKind::Interface => Declaration::Interface(InterfaceDeclaration {
                    fqn,
                    start: d.start,
                    extends: d.heritage.iter().map(|n| resolve_name(scope, n)).collect(),
                    members: d.members,
                }),
                DeclarationKind::Function => Declaration::Function(FunctionDeclaration {
                    fqn,
                    start: d.start,
                }),
            }
        })
        .collect()
}

fn text(node: Node<'_>, source: &[u8]) -> Option<String> {
    let raw = node.utf8_text(source).ok()?;
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        None
    } else {
        Some(compact)
    }
}

fn declaration_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    text(node.child_by_field_name("name")?, source)
}

fn read_class(node: Node<'_>, source: &[u8], scope: usize) -> Option<RawDeclaration> {
    let name = declaration_name(node, source)?;
    let mut base_class = None;
    let mut interfaces = Vec::new();

    let mut cursor = node.walk();
    for heritage in node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "class_heritage")
    {
        let mut inner = heritage.walk();
        for clause in heritage.named_children(&mut inner) {
            match clause.kind() {
                "extends_clause" => {
                    // Only one base class is legal; the first value wins.
                    let mut values = clause.walk();
                    base_class = clause
                        .named_children(&mut values)
                        .find(|v| v.kind() != "type_arguments")
                        .and_then(|v| type_name(v, source));
                }
                "implements_clause" => {
                    let mut types = clause.walk();
                    interfaces.extend(
                        clause
                            .named_children(&mut types)
                            .filter_map(|t| type_name(t, source)),
                    );
                }
                _ => {}
            }
        }
    }

    Some(RawDeclaration {
        kind: DeclarationKind::Class,
        scope,
        name,
        start: node.start_byte(),
        base_class,
        heritage: interfaces,
        members: read_members(node, source),
    })
}

fn read_interface(node: Node<'_>, source: &[u8], scope: usize) -> Option<RawDeclaration> {
    let name = declaration_name(node, source)?;
    let mut extends = Vec::new();

    let mut cursor = node.walk();
    for clause in node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "extends_type_clause")
    {
        let mut types = clause.walk();
        extends.extend(
            clause
                .named_children(&mut types)
                .filter_map(|t| type_name(t, source)),
        );
    }

    Some(RawDeclaration {
        kind: DeclarationKind::Interface,
        scope,
        name,
        start: node.start_byte(),
        base_class: None,
        heritage: extends,
        members: read_members(node, source),
    })
}

fn read_function(node: Node<'_>, source: &[u8], scope: usize) -> Option<RawDeclaration> {
    Some(RawDeclaration {
        kind: DeclarationKind::Function,
        scope,
        name: declaration_name(node, source)?,
        start: node.start_byte(),
        base_class: None,
        heritage: Vec::new(),
        members: Vec::new(),
    })
}

/// Name of a referenced type, with type arguments stripped.
fn type_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "identifier" | "type_identifier" | "nested_type_identifier" | "nested_identifier"
        | "member_expression" => text(node, source),
        "generic_type" => {
            let name = node
                .child_by_field_name("name")
                .or_else(|| node.named_child(0))?;
            type_name(name, source)
        }
        _ => None,
    }
}

fn read_members(node: Node<'_>, source: &[u8]) -> Vec<MemberDeclaration> {
    let Some(body) = node.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut members: Vec<MemberDeclaration> = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        let kind = match child.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                MemberKind::Method
            }
            "public_field_definition" | "property_signature" => MemberKind::Property,
            _ => continue,
        };
        // Computed, string and private names have no identifier form.
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        if name_node.kind() != "property_identifier" {
            continue;
        }
        let Some(name) = text(name_node, source) else {
            continue;
        };
        let member = MemberDeclaration { kind, name };
        if !members.contains(&member) {
            members.push(member);
        }
    }
    members
}

/// Scope segments a namespace adds, or `None` for string-named modules.
fn namespace_segments(node: Node<'_>, source: &[u8]) -> Option<Vec<String>> {
    let name = node.child_by_field_name("name")?;
    match name.kind() {
        "identifier" | "nested_identifier" => {
            let dotted = text(name, source)?;
            Some(dotted.split('.').map(str::to_string).collect())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{parse_source, Language};

    fn parse(source: &str) -> Vec<Declaration> {
        parse_source(Language::TypeScript, source.as_bytes())
            .unwrap()
            .unwrap()
            .declarations
    }

    fn class(decls: &[Declaration], fqn: &str) -> ClassDeclaration {
        decls
            .iter()
            .find_map(|d| match d {
                Declaration::Class(c) if c.fqn == fqn => Some(c.clone()),
                _ => None,
            })
            .unwrap()
    }

    fn interface(decls: &[Declaration], fqn: &str) -> InterfaceDeclaration {
        decls
            .iter()
            .find_map(|d| match d {
                Declaration::Interface(i) if i.fqn == fqn => Some(i.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_class_heritage() {
        let decls = parse("class A extends B implements I, J {}");
        let a = class(&decls, "A");
        assert_eq!(a.base_class.as_deref(), Some("B"));
        assert_eq!(a.interfaces, vec!["I".to_string(), "J".to_string()]);
        assert_eq!(a.start, 0);
    }

    #[test]
    fn test_generic_heritage_drops_type_arguments() {
        let decls = parse("class A extends Base<string> implements Box<number> {}");
        let a = class(&decls, "A");
        assert_eq!(a.base_class.as_deref(), Some("Base"));
        assert_eq!(a.interfaces, vec!["Box".to_string()]);
    }

    #[test]
    fn test_interface_extends() {
        let decls = parse("interface I extends J, K {}");
        let i = interface(&decls, "I");
        assert_eq!(i.extends, vec!["J".to_string(), "K".to_string()]);
    }

    #[test]
    fn test_function_start_offset() {
        let source = "const x = 1;\nfunction foo() {}\n";
        let decls = parse(source);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].fqn(), "foo");
        assert_eq!(decls[0].start(), source.find("function").unwrap());
    }

    #[test]
    fn test_ambient_function_signatures() {
        let decls = parse(
            "declare function foo(): void;\nexport declare function bar(x: number): string;",
        );
        let fqns: Vec<&str> = decls.iter().map(|d| d.fqn()).collect();
        assert_eq!(fqns, vec!["foo", "bar"]);
        assert!(decls.iter().all(|d| d.kind() == DeclarationKind::Function));
    }

    #[test]
    fn test_overloads_end_on_implementation() {
        let source = "function o(a: string): void;\nfunction o(a: any) {}\n";
        let decls = parse(source);
        assert_eq!(decls.len(), 2);
        assert!(decls.iter().all(|d| d.fqn() == "o"));
        assert_eq!(decls[0].start(), 0);
        assert_eq!(decls[1].start(), source.rfind("function").unwrap());
    }

    #[test]
    fn test_declared_namespace_functions() {
        let decls = parse("declare namespace A { function f(): void; class B {} }");
        let fqns: Vec<&str> = decls.iter().map(|d| d.fqn()).collect();
        assert_eq!(fqns, vec!["A.f", "A.B"]);
    }

    #[test]
    fn test_exported_declarations_are_found() {
        let decls = parse("export class A {}\nexport function f() {}\nexport interface I {}");
        let fqns: Vec<&str> = decls.iter().map(|d| d.fqn()).collect();
        assert_eq!(fqns, vec!["A", "f", "I"]);
    }

    #[test]
    fn test_namespace_scopes_and_resolution() {
        let source = r#"
namespace Shapes {
    export interface Shape {}
    export namespace Round {
        export class Circle implements Shape, Other {}
    }
}
"#;
        let decls = parse(source);
        let circle = class(&decls, "Shapes.Round.Circle");
        assert_eq!(
            circle.interfaces,
            vec!["Shapes.Shape".to_string(), "Other".to_string()]
        );
        interface(&decls, "Shapes.Shape");
    }

    #[test]
    fn test_dotted_namespace_name() {
        let decls = parse("namespace A.B { function f() {} }");
        assert_eq!(decls[0].fqn(), "A.B.f");
    }

    #[test]
    fn test_nested_declarations_are_not_rematched() {
        let decls = parse("function outer() { function inner() {} class Local {} }");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].fqn(), "outer");
    }

    #[test]
    fn test_members() {
        let source = r#"
abstract class A {
    color: string;
    run() {}
    abstract stop(): void;
    ["computed"]() {}
}
interface I {
    size: number;
    area(): number;
}
"#;
        let decls = parse(source);
        let a = class(&decls, "A");
        assert_eq!(
            a.members,
            vec![
                MemberDeclaration {
                    kind: MemberKind::Property,
                    name: "color".to_string()
                },
                MemberDeclaration {
                    kind: MemberKind::Method,
                    name: "run".to_string()
                },
                MemberDeclaration {
                    kind: MemberKind::Method,
                    name: "stop".to_string()
                },
            ]
        );

        let i = interface(&decls, "I");
        assert_eq!(i.members.len(), 2);
        assert_eq!(i.members[1].kind, MemberKind::Method);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut source = String::new();
        for _ in 0..1000 {
            source.push_str("{ ");
        }
        source.push_str("function deep() {}");
        for _ in 0..1000 {
            source.push_str(" }");
        }
        let decls = parse(&source);
        assert!(decls.iter().any(|d| d.fqn() == "deep"));
    }
}
