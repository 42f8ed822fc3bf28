//! Source parsing: turns file bytes into the closed set of declarations the
//! extractors consume.

pub mod detect;
pub mod pool;
pub mod typescript;

pub use detect::{detect_language, Language};

use crate::error::Result;
use crate::record::MemberKind;

/// Separator between scope segments in a fully-qualified name.
pub const SCOPE_SEPARATOR: &str = ".";

/// Kind of declaration node. Class, interface and function shapes are
/// mutually exclusive in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Interface,
    Function,
}

/// A member declared in a class or interface body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDeclaration {
    pub kind: MemberKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    pub fqn: String,
    /// Byte offset of the declaration node
    pub start: usize,
    pub base_class: Option<String>,
    pub interfaces: Vec<String>,
    pub members: Vec<MemberDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDeclaration {
    pub fqn: String,
    pub start: usize,
    pub extends: Vec<String>,
    pub members: Vec<MemberDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub fqn: String,
    pub start: usize,
}

/// One declaration found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassDeclaration),
    Interface(InterfaceDeclaration),
    Function(FunctionDeclaration),
}

impl Declaration {
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Class(_) => DeclarationKind::Class,
            Declaration::Interface(_) => DeclarationKind::Interface,
            Declaration::Function(_) => DeclarationKind::Function,
        }
    }

    pub fn fqn(&self) -> &str {
        match self {
            Declaration::Class(d) => &d.fqn,
            Declaration::Interface(d) => &d.fqn,
            Declaration::Function(d) => &d.fqn,
        }
    }

    pub fn start(&self) -> usize {
        match self {
            Declaration::Class(d) => d.start,
            Declaration::Interface(d) => d.start,
            Declaration::Function(d) => d.start,
        }
    }
}

/// Parser output for one file.
#[derive(Debug, Clone)]
pub struct SourceTree {
    pub language: Language,
    /// Declarations in document order
    pub declarations: Vec<Declaration>,
    /// True if the parser had to recover from syntax errors
    pub has_errors: bool,
}

/// Parse `source` and collect its declarations.
///
/// Returns `Ok(None)` if the parser produced no tree at all. Syntax errors
/// do not fail the parse: tree-sitter recovers and the declarations it can
/// still see are returned.
pub fn parse_source(language: Language, source: &[u8]) -> Result<Option<SourceTree>> {
    pool::with_parser(language, |parser| {
        let tree = parser.parse(source, None)?;
        let root = tree.root_node();
        Some(SourceTree {
            language,
            declarations: typescript::collect_declarations(root, source),
            has_errors: root.has_error(),
        })
    })
}

/// Join scope segments and a name into a fully-qualified name.
pub fn qualify(scope: &[String], name: &str) -> String {
    if scope.is_empty() {
        return name.to_string();
    }
    let mut fqn = scope.join(SCOPE_SEPARATOR);
    fqn.push_str(SCOPE_SEPARATOR);
    fqn.push_str(name);
    fqn
}
