//! `git` command line backend

use crate::error::ToolError;
use crate::process::run_captured;
use crate::vcs::{Revision, Vcs};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Default git executable
pub const DEFAULT_GIT: &str = "git";

/// Vcs implementation that shells out to git
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    root: PathBuf,
}

impl GitCli {
    /// Create a backend for a known repository root
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
        }
    }

    /// Locate the repository containing `dir` via `git rev-parse --show-toplevel`
    pub async fn discover(program: impl Into<String>, dir: &Path) -> Result<Self, ToolError> {
        let program = program.into();
        let stdout = run_captured(&program, &["rev-parse", "--show-toplevel"], dir).await?;
        let root = String::from_utf8(stdout)
            .map_err(|e| ToolError::invalid_output(program.as_str(), e.to_string()))?;
        let root = root.trim();
        if root.is_empty() {
            return Err(ToolError::invalid_output(
                program.as_str(),
                "empty repository root",
            ));
        }
        tracing::debug!(root, "found repository root");
        Ok(Self::new(program, root))
    }
}

#[async_trait]
impl Vcs for GitCli {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn changed_files(&self, base: &str) -> Result<Vec<String>, ToolError> {
        let stdout = run_captured(
            &self.program,
            &["diff", "--name-only", "-z", base, "--"],
            &self.root,
        )
        .await?;
        parse_name_list(&self.program, &stdout)
    }

    async fn read_file(&self, revision: &Revision, path: &Path) -> Result<Vec<u8>, ToolError> {
        match revision {
            Revision::WorkingTree => {
                let full_path = self.root.join(path);
                tokio::fs::read(&full_path)
                    .await
                    .map_err(|e| ToolError::read_file(full_path, e))
            }
            Revision::Commit(rev) => {
                let object = format!("{}:{}", rev, git_path(path));
                run_captured(&self.program, &["show", &object], &self.root).await
            }
        }
    }
}

/// Split NUL-separated `git diff -z` output
fn parse_name_list(program: &str, stdout: &[u8]) -> Result<Vec<String>, ToolError> {
    stdout
        .split(|b| *b == 0)
        .filter(|name| !name.is_empty())
        .map(|name| {
            String::from_utf8(name.to_vec())
                .map_err(|e| ToolError::invalid_output(program, e.to_string()))
        })
        .collect()
}

/// Repository-relative path with `/` separators, as git expects in `rev:path`
fn git_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
