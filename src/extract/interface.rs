use super::class_like::{index_class_like, ClassLike};
use super::Extractor;
use crate::error::Result;
use crate::ingest::{Declaration, DeclarationKind};
use crate::provider::FileInfo;
use crate::record::{ClassKind, Contribution};
use crate::store::RecordStore;

/// Indexes interface declarations. Each extended interface becomes an
/// `implements` edge.
pub struct InterfaceExtractor;

impl Extractor for InterfaceExtractor {
    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Interface
    }

    fn index(
        &self,
        store: &dyn RecordStore,
        file: &FileInfo,
        declaration: &Declaration,
    ) -> Result<Vec<Contribution>> {
        let Declaration::Interface(interface) = declaration else {
            return Ok(Vec::new());
        };

        index_class_like(
            store,
            file,
            ClassLike {
                fqn: &interface.fqn,
                kind: ClassKind::Interface,
                start: interface.start,
                heritage: interface.extends.iter().map(String::as_str).collect(),
                members: &interface.members,
            },
        )
    }
}
