//! Edge maintenance shared by the class and interface extractors.
//!
//! Order matters. Outgoing edges recorded on the previous index are retired
//! on their targets first, then rebuilt from the current declaration. A
//! target dropped from the heritage clause therefore loses its reverse edge
//! on the very next index of the declaring file.

use tracing::trace;

use crate::error::Result;
use crate::ingest::MemberDeclaration;
use crate::provider::FileInfo;
use crate::record::{ClassKind, Contribution, MemberIdentifier};
use crate::store::{RecordStore, StoreExt};

pub(crate) struct ClassLike<'a> {
    pub fqn: &'a str,
    pub kind: ClassKind,
    pub start: usize,
    /// Base class first, then interfaces, as written
    pub heritage: Vec<&'a str>,
    pub members: &'a [MemberDeclaration],
}

pub(crate) fn index_class_like(
    store: &dyn RecordStore,
    file: &FileInfo,
    decl: ClassLike<'_>,
) -> Result<Vec<Contribution>> {
    let path = file.key_path();
    let fqn = decl.fqn;

    let mut record = store.class_entry(fqn)?;
    record.stamp(decl.kind, decl.start, &path, file.last_modified);

    for target in record.implements().to_vec() {
        if store.update_class(&target, |t| t.remove_implementation(fqn))? {
            trace!(class = fqn, target = %target, "removed stale implementation edge");
        }
    }
    record.clear_implemented();

    for name in decl.heritage {
        if record.add_implements(name) {
            store.update_class(name, |t| t.add_implementation(fqn))?;
        }
    }

    // Merge rather than overwrite: `implementations` on the stored record
    // may have been changed above if this declaration references itself.
    store.update_class(fqn, |stored| stored.apply_declaration(&record))?;

    let mut contributions = vec![Contribution::class(fqn)];
    for member in decl.members {
        let Some(identifier) = MemberIdentifier::new(member.kind, &member.name) else {
            trace!(class = fqn, member = %member.name, "member name has no identifier form");
            continue;
        };
        store.update_member(&identifier, |m| m.add_declaration(fqn, &path))?;
        contributions.push(Contribution::member(identifier, fqn));
    }

    Ok(contributions)
}
