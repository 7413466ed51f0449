//! Build unit (Go package) snapshot as produced by `go list -json`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The module a package belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleRef {
    /// Module path, e.g. `github.com/org/repo`
    pub path: String,
    /// Full path to the module directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Full path to the module's go.mod file
    #[serde(default)]
    pub go_mod: Option<PathBuf>,
}

/// A compilable package together with its flattened dependency closure
///
/// `deps` must already be transitively closed: if A imports B and B imports C,
/// C is listed in A's `deps`. The detector relies on this and never walks the
/// dependency graph itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildUnit {
    /// Full path to the package directory
    pub dir: PathBuf,
    /// Import path of the package
    pub import_path: String,
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Owning module, absent for standard library and GOPATH packages
    #[serde(default)]
    pub module: Option<ModuleRef>,
    /// Go source files, relative to `dir`
    #[serde(default)]
    pub go_files: Vec<String>,
    /// Import paths of every package reachable from this one
    #[serde(default)]
    pub deps: Vec<String>,
}

impl BuildUnit {
    /// Creates a build unit with no files, dependencies or module
    pub fn new(import_path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            import_path: import_path.into(),
            name: String::new(),
            module: None,
            go_files: Vec::new(),
            deps: Vec::new(),
        }
    }

    /// Sets the source files (builder pattern)
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.go_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the flattened dependency list (builder pattern)
    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the owning module (builder pattern)
    pub fn with_module(mut self, path: impl Into<String>, go_mod: impl Into<PathBuf>) -> Self {
        let go_mod = go_mod.into();
        self.module = Some(ModuleRef {
            path: path.into(),
            dir: go_mod.parent().map(Path::to_path_buf),
            go_mod: Some(go_mod),
        });
        self
    }

    /// Absolute paths of the package's own source files
    pub fn source_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.go_files.iter().map(|file| self.dir.join(file))
    }

    /// Path of the go.mod that governs this package's external dependencies
    pub fn manifest_path(&self) -> Option<&Path> {
        self.module
            .as_ref()
            .and_then(|m| m.go_mod.as_deref())
            .filter(|p| !p.as_os_str().is_empty())
    }
}
