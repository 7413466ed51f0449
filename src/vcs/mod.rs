//! Version control access
//!
//! This module provides:
//! - The `Vcs` trait the detector reads changed files and historical content through
//! - `GitCli`, the implementation backed by the `git` executable

mod git;

pub use git::{GitCli, DEFAULT_GIT};

use crate::error::ToolError;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Which state of the repository to read from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Revision {
    /// The current checkout, including uncommitted edits
    WorkingTree,
    /// A committed revision such as `HEAD~` or a SHA
    Commit(String),
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::WorkingTree => write!(f, "working tree"),
            Revision::Commit(rev) => write!(f, "{}", rev),
        }
    }
}

/// Read access to a version-controlled working tree
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Absolute path of the repository root
    fn root(&self) -> &Path;

    /// Paths, relative to the root, that differ between `base` and the working tree
    async fn changed_files(&self, base: &str) -> Result<Vec<String>, ToolError>;

    /// Contents of `path` (relative to the root) as of `revision`
    async fn read_file(&self, revision: &Revision, path: &Path) -> Result<Vec<u8>, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_display() {
        assert_eq!(Revision::WorkingTree.to_string(), "working tree");
        assert_eq!(Revision::Commit("HEAD~".to_string()).to_string(), "HEAD~");
    }
}
