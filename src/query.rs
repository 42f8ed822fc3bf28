//! Read-only query surface over a record store.
//!
//! Every lookup returns `Ok(None)` for "not found". Errors are reserved for
//! storage failures and kind mismatches.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

use crate::error::Result;
use crate::record::{ClassRecord, FileRecord, FunctionRecord, MemberIdentifier, MemberRecord};
use crate::store::{RecordStore, StoreExt};

/// Lookups over the index for navigation and completion.
#[derive(Clone)]
pub struct IndexQueryAgent {
    store: Arc<dyn RecordStore>,
}

impl IndexQueryAgent {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Class and interface queries.
    pub fn class(&self) -> ClassQuery<'_> {
        ClassQuery {
            store: self.store.as_ref(),
        }
    }

    pub fn function(&self, fqn: &str) -> Result<Option<FunctionRecord>> {
        self.store.function(fqn)
    }

    pub fn file(&self, path: &str) -> Result<Option<FileRecord>> {
        self.store.file_record(path)
    }

    /// Look up a member by raw identifier such as `method#render`.
    ///
    /// A malformed identifier yields `None` without touching the store.
    pub fn member(&self, identifier: &str) -> Result<Option<MemberRecord>> {
        match MemberIdentifier::parse(identifier) {
            Some(identifier) => self.store.member(&identifier),
            None => Ok(None),
        }
    }
}

/// Class and interface lookups, including walks over the reverse edge.
pub struct ClassQuery<'a> {
    store: &'a dyn RecordStore,
}

impl ClassQuery<'_> {
    pub fn get(&self, fqn: &str) -> Result<Option<ClassRecord>> {
        self.store.class(fqn)
    }

    /// Direct implementors and subclasses of `fqn`.
    pub fn implementations(&self, fqn: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .store
            .class(fqn)?
            .map(|r| r.implementations().clone())
            .unwrap_or_default())
    }

    /// Names `fqn` extends or implements, in declaration order.
    pub fn implements(&self, fqn: &str) -> Result<Vec<String>> {
        Ok(self
            .store
            .class(fqn)?
            .map(|r| r.implements().to_vec())
            .unwrap_or_default())
    }

    /// Every declaration that reaches `fqn` through one or more
    /// implementations edges, breadth first. `fqn` itself is only included
    /// if it lies on a cycle.
    pub fn all_implementations(&self, fqn: &str) -> Result<Vec<String>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<String> = VecDeque::from([fqn.to_string()]);

        while let Some(current) = queue.pop_front() {
            for name in self.implementations(&current)? {
                if seen.insert(name.clone()) {
                    order.push(name.clone());
                    queue.push_back(name);
                }
            }
        }

        Ok(order)
    }
}
