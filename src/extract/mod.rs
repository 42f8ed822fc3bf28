//! Extractors turn declarations into record mutations.
//!
//! There is one extractor per [`DeclarationKind`]. The builder looks up the
//! handler for a declaration's kind in an [`ExtractorTable`]; registering a
//! second handler for a kind that already has one is refused, so the first
//! registration wins.

mod class;
mod class_like;
mod function;
mod interface;

pub use class::ClassExtractor;
pub use function::FunctionExtractor;
pub use interface::InterfaceExtractor;

use std::collections::HashMap;

use crate::error::Result;
use crate::ingest::{Declaration, DeclarationKind};
use crate::provider::FileInfo;
use crate::record::Contribution;
use crate::store::RecordStore;

/// Handler for one declaration kind.
pub trait Extractor: Send + Sync {
    /// Declaration kind this extractor is registered under.
    fn kind(&self) -> DeclarationKind;

    /// Whether this extractor handles `declaration`.
    fn can_index(&self, declaration: &Declaration) -> bool {
        declaration.kind() == self.kind()
    }

    /// Apply `declaration` to the store and return the records it touched
    /// on behalf of `file`.
    fn index(
        &self,
        store: &dyn RecordStore,
        file: &FileInfo,
        declaration: &Declaration,
    ) -> Result<Vec<Contribution>>;
}

/// Dispatch table from declaration kind to extractor.
pub struct ExtractorTable {
    handlers: HashMap<DeclarationKind, Box<dyn Extractor>>,
}

impl ExtractorTable {
    /// A table with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Class, interface and function extractors.
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        table.register(Box::new(ClassExtractor));
        table.register(Box::new(InterfaceExtractor));
        table.register(Box::new(FunctionExtractor));
        table
    }

    /// Register an extractor. Returns false, leaving the table unchanged,
    /// if its kind already has one.
    pub fn register(&mut self, extractor: Box<dyn Extractor>) -> bool {
        let kind = extractor.kind();
        if self.handlers.contains_key(&kind) {
            return false;
        }
        self.handlers.insert(kind, extractor);
        true
    }

    /// The extractor responsible for `declaration`, if any.
    pub fn for_declaration(&self, declaration: &Declaration) -> Option<&dyn Extractor> {
        self.handlers
            .get(&declaration.kind())
            .map(|e| e.as_ref())
            .filter(|e| e.can_index(declaration))
    }
}

impl Default for ExtractorTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
