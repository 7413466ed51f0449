//! The set of modified Go source files

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Source file suffix that counts as a code change
pub const GO_SOURCE_SUFFIX: &str = ".go";

/// Absolute paths of modified `.go` files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFileSet {
    files: HashSet<PathBuf>,
}

impl ChangedFileSet {
    /// Build the set from paths relative to `root`, keeping only Go sources
    pub fn from_relative<I, S>(root: &Path, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let files = files
            .into_iter()
            .filter(|f| f.as_ref().ends_with(GO_SOURCE_SUFFIX))
            .map(|f| root.join(f.as_ref()))
            .collect();
        Self { files }
    }

    /// Returns true if `path` (absolute) was modified
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    /// Number of modified source files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no source file was modified
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
