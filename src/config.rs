//! Detection run configuration

use crate::error::PathError;
use std::path::{Path, PathBuf};

/// Base revision used when none is given
pub const DEFAULT_BASE_REVISION: &str = "HEAD~";

/// Everything a detection run needs to know up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Absolute path of the repository root
    pub repo_root: PathBuf,
    /// Revision the working tree is compared against
    pub base_revision: String,
    /// Absolute module directories to list packages from; empty means discover
    pub module_paths: Vec<PathBuf>,
}

impl DetectorConfig {
    /// Create a configuration for the repository at `repo_root`
    pub fn new(repo_root: impl AsRef<Path>) -> Result<Self, PathError> {
        Ok(Self {
            repo_root: absolute(repo_root.as_ref())?,
            base_revision: DEFAULT_BASE_REVISION.to_string(),
            module_paths: Vec::new(),
        })
    }

    /// Set the base revision (builder pattern)
    pub fn with_base_revision(mut self, revision: impl Into<String>) -> Self {
        self.base_revision = revision.into();
        self
    }

    /// Set explicit module directories (builder pattern)
    ///
    /// Relative paths are taken relative to the current directory. Duplicates
    /// are dropped, keeping the first occurrence.
    pub fn with_module_paths<I, P>(mut self, paths: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut module_paths: Vec<PathBuf> = Vec::new();
        for path in paths {
            let path = absolute(path.as_ref())?;
            if !module_paths.contains(&path) {
                module_paths.push(path);
            }
        }
        self.module_paths = module_paths;
        Ok(self)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, PathError> {
    std::path::absolute(path).map_err(|e| PathError::absolutize(path, e))
}
