use super::Extractor;
use crate::error::Result;
use crate::ingest::{Declaration, DeclarationKind};
use crate::provider::FileInfo;
use crate::record::Contribution;
use crate::store::{RecordStore, StoreExt};

/// Indexes function declarations. Functions carry no edges.
pub struct FunctionExtractor;

impl Extractor for FunctionExtractor {
    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Function
    }

    fn index(
        &self,
        store: &dyn RecordStore,
        file: &FileInfo,
        declaration: &Declaration,
    ) -> Result<Vec<Contribution>> {
        let Declaration::Function(function) = declaration else {
            return Ok(Vec::new());
        };

        let path = file.key_path();
        store.update_function(&function.fqn, |record| {
            let before = record.clone();
            record.stamp(function.start, &path, file.last_modified);
            *record != before
        })?;

        Ok(vec![Contribution::function(function.fqn.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::FunctionDeclaration;
    use crate::store::InMemoryStore;
    use std::path::PathBuf;

    #[test]
    fn test_function_is_stamped() {
        let store = InMemoryStore::new();
        let file = FileInfo::new(PathBuf::from("/src/f.ts"), 9);
        let decl = Declaration::Function(FunctionDeclaration {
            fqn: "util.foo".to_string(),
            start: 13,
        });

        let contributions = FunctionExtractor.index(&store, &file, &decl).unwrap();
        assert_eq!(contributions, vec![Contribution::function("util.foo")]);

        let record = store.function("util.foo").unwrap().unwrap();
        assert_eq!(record.start(), Some(13));
        assert_eq!(record.file_path(), Some("/src/f.ts"));
        assert_eq!(record.last_modified(), Some(9));
    }
}
