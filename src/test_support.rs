//! In-memory collaborators for tests
//!
//! `MemoryVcs` and `MemoryLister` stand in for git and `go list` so the
//! detector can be exercised without a repository or a Go toolchain. Both
//! count how often they are asked for each piece of data.
//!
//! ```rust,ignore
//! let vcs = MemoryVcs::new("/repo")
//!     .with_changed(["a/a.go"])
//!     .with_file(Revision::WorkingTree, "go.mod", "module example.com/m\n");
//! ```

use crate::domain::BuildUnit;
use crate::error::ToolError;
use crate::toolchain::PackageLister;
use crate::vcs::{Revision, Vcs};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Vcs backed by in-memory file contents
#[derive(Debug, Default)]
pub struct MemoryVcs {
    root: PathBuf,
    changed: Vec<String>,
    files: HashMap<(Revision, PathBuf), Vec<u8>>,
    reads: Mutex<HashMap<(Revision, PathBuf), usize>>,
}

impl MemoryVcs {
    /// Create a repository rooted at `root` with no changes
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Set the files reported as changed (relative to the root)
    pub fn with_changed<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed = files.into_iter().map(Into::into).collect();
        self
    }

    /// Add file content at a revision (path relative to the root)
    pub fn with_file(
        mut self,
        revision: Revision,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.files.insert((revision, path.into()), content.into());
        self
    }

    /// Add the same content at the working tree and at `base`
    pub fn with_unchanged_file(
        self,
        base: &str,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let path = path.into();
        let content = content.into();
        self.with_file(Revision::WorkingTree, path.clone(), content.clone())
            .with_file(Revision::Commit(base.to_string()), path, content)
    }

    /// How many times `path` was read at `revision`
    pub fn read_count(&self, revision: &Revision, path: impl AsRef<Path>) -> usize {
        let reads = self.reads.lock().unwrap_or_else(|e| e.into_inner());
        reads
            .get(&(revision.clone(), path.as_ref().to_path_buf()))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of reads across all paths and revisions
    pub fn total_reads(&self) -> usize {
        let reads = self.reads.lock().unwrap_or_else(|e| e.into_inner());
        reads.values().sum()
    }
}

#[async_trait]
impl Vcs for MemoryVcs {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn changed_files(&self, _base: &str) -> Result<Vec<String>, ToolError> {
        Ok(self.changed.clone())
    }

    async fn read_file(&self, revision: &Revision, path: &Path) -> Result<Vec<u8>, ToolError> {
        let key = (revision.clone(), path.to_path_buf());
        {
            let mut reads = self.reads.lock().unwrap_or_else(|e| e.into_inner());
            *reads.entry(key.clone()).or_insert(0) += 1;
        }
        self.files.get(&key).cloned().ok_or_else(|| {
            ToolError::invalid_output(
                "memory-vcs",
                format!("no {} at {}", path.display(), revision),
            )
        })
    }
}

/// PackageLister backed by a fixed set of units per module directory
#[derive(Debug, Default)]
pub struct MemoryLister {
    modules: HashMap<PathBuf, Vec<BuildUnit>>,
}

impl MemoryLister {
    /// Create an empty lister
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the units returned for `module_dir`
    pub fn with_module(mut self, module_dir: impl Into<PathBuf>, units: Vec<BuildUnit>) -> Self {
        self.modules.insert(module_dir.into(), units);
        self
    }
}

#[async_trait]
impl PackageLister for MemoryLister {
    async fn list_build_units(&self, module_dir: &Path) -> Result<Vec<BuildUnit>, ToolError> {
        self.modules.get(module_dir).cloned().ok_or_else(|| {
            ToolError::invalid_output(
                "memory-lister",
                format!("unknown module {}", module_dir.display()),
            )
        })
    }
}
