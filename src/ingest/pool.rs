//! Thread-local parser pool.
//!
//! Each thread keeps one tree-sitter parser per language, created on first
//! use. Rayon workers in parallel indexing each get their own.

use std::cell::RefCell;
use std::thread::LocalKey;

use crate::error::Result;
use crate::ingest::detect::Language;

thread_local! {
    static TYPESCRIPT_PARSER: RefCell<Option<tree_sitter::Parser>> = const { RefCell::new(None) };
    static TSX_PARSER: RefCell<Option<tree_sitter::Parser>> = const { RefCell::new(None) };
}

fn slot(language: Language) -> &'static LocalKey<RefCell<Option<tree_sitter::Parser>>> {
    match language {
        Language::TypeScript => &TYPESCRIPT_PARSER,
        Language::Tsx => &TSX_PARSER,
    }
}

/// Run `f` with this thread's parser for `language`.
///
/// Fails only if the grammar cannot be loaded into a fresh parser.
pub fn with_parser<F, R>(language: Language, f: F) -> Result<R>
where
    F: FnOnce(&mut tree_sitter::Parser) -> R,
{
    slot(language).with(|cell| {
        let mut cached = cell.borrow_mut();
        if cached.is_none() {
            let mut parser = tree_sitter::Parser::new();
            parser.set_language(&language.grammar())?;
            *cached = Some(parser);
        }
        let parser = cached.get_or_insert_with(tree_sitter::Parser::new);
        Ok(f(parser))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_reused() {
        let first = with_parser(Language::TypeScript, |p| p as *const _ as usize).unwrap();
        let second = with_parser(Language::TypeScript, |p| p as *const _ as usize).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_languages_have_separate_parsers() {
        let ts = with_parser(Language::TypeScript, |p| {
            p.parse("class A {}", None).map(|t| t.root_node().kind().to_string())
        })
        .unwrap();
        let tsx = with_parser(Language::Tsx, |p| {
            p.parse("const a = <div />;", None).map(|t| t.root_node().has_error())
        })
        .unwrap();
        assert_eq!(ts.as_deref(), Some("program"));
        assert_eq!(tsx, Some(false));
    }
}
