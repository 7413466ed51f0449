//! Module versions, requirements and replacements as declared in go.mod

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A module path paired with a version
///
/// The version is empty for wildcard replacement sources and for
/// filesystem replacement targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleVersion {
    /// Module path
    pub path: String,
    /// Version string, possibly empty
    pub version: String,
}

impl ModuleVersion {
    /// Creates a new module version
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }

    /// Creates a module version with no version (matches any version)
    pub fn any(path: impl Into<String>) -> Self {
        Self::new(path, "")
    }

    /// Returns true if no version is attached
    pub fn is_wildcard(&self) -> bool {
        self.version.is_empty()
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.version)
    }
}

/// A `require` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Required module and version
    pub module: ModuleVersion,
}

impl Requirement {
    /// Creates a requirement
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module: ModuleVersion::new(path, version),
        }
    }
}

/// A `replace` directive: `old [version] => new [version]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Module being replaced; an empty version replaces every version
    pub old: ModuleVersion,
    /// Replacement target; an empty version keeps the required version
    pub new: ModuleVersion,
}

impl Replacement {
    /// Creates a new replacement
    pub fn new(old: ModuleVersion, new: ModuleVersion) -> Self {
        Self { old, new }
    }
}

/// One parsed go.mod file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSnapshot {
    /// Where the manifest was read from
    pub path: PathBuf,
    /// The `module` directive, if present
    pub module: Option<String>,
    /// `require` entries in file order
    pub requires: Vec<Requirement>,
    /// `replace` directives in file order
    pub replacements: Vec<Replacement>,
}

impl ManifestSnapshot {
    /// Creates an empty snapshot for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Adds a requirement (builder pattern)
    pub fn require(mut self, path: &str, version: &str) -> Self {
        self.requires.push(Requirement::new(path, version));
        self
    }

    /// Adds a replacement (builder pattern)
    pub fn replace(mut self, old: ModuleVersion, new: ModuleVersion) -> Self {
        self.replacements.push(Replacement::new(old, new));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_version_display() {
        let mv = ModuleVersion::new("github.com/pkg/errors", "v0.9.1");
        assert_eq!(mv.to_string(), "github.com/pkg/errors@v0.9.1");
    }

    #[test]
    fn test_module_version_any() {
        let mv = ModuleVersion::any("github.com/pkg/errors");
        assert!(mv.is_wildcard());
        assert_eq!(mv.to_string(), "github.com/pkg/errors@");
    }

    #[test]
    fn test_snapshot_builder() {
        let snapshot = ManifestSnapshot::new("/repo/go.mod")
            .require("example.com/x", "v1.0.0")
            .replace(
                ModuleVersion::any("example.com/x"),
                ModuleVersion::any("../x"),
            );
        assert_eq!(snapshot.requires.len(), 1);
        assert_eq!(snapshot.replacements.len(), 1);
        assert_eq!(snapshot.requires[0].module.version, "v1.0.0");
    }
}
