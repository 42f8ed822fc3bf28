use serde::{Deserialize, Serialize};

/// Record for a function declaration. Carries no relationship edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    fqn: String,
    start: Option<usize>,
    file_path: Option<String>,
    last_modified: Option<i64>,
}

impl FunctionRecord {
    pub fn new(fqn: String) -> Self {
        Self {
            fqn,
            start: None,
            file_path: None,
            last_modified: None,
        }
    }

    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    /// Byte offset of the declaration in its file.
    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn stamp(&mut self, start: usize, file_path: &str, last_modified: i64) {
        self.start = Some(start);
        self.file_path = Some(file_path.to_string());
        self.last_modified = Some(last_modified);
    }
}
