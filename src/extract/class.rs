use super::class_like::{index_class_like, ClassLike};
use super::Extractor;
use crate::error::Result;
use crate::ingest::{Declaration, DeclarationKind};
use crate::provider::FileInfo;
use crate::record::{ClassKind, Contribution};
use crate::store::RecordStore;

/// Indexes class declarations. The base class and every implemented
/// interface become `implements` edges.
pub struct ClassExtractor;

impl Extractor for ClassExtractor {
    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Class
    }

    fn index(
        &self,
        store: &dyn RecordStore,
        file: &FileInfo,
        declaration: &Declaration,
    ) -> Result<Vec<Contribution>> {
        let Declaration::Class(class) = declaration else {
            return Ok(Vec::new());
        };

        let heritage = class
            .base_class
            .iter()
            .chain(class.interfaces.iter())
            .map(String::as_str)
            .collect();

        index_class_like(
            store,
            file,
            ClassLike {
                fqn: &class.fqn,
                kind: ClassKind::Class,
                start: class.start,
                heritage,
                members: &class.members,
            },
        )
    }
}
