//! The set of packages classified as changed during a detection run

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Why a package ended up in the change set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeReason {
    /// One of the package's own source files was modified
    SourceChanged { file: PathBuf },
    /// The package depends on another package of this tree that changed
    DependsOnPackage { package: String },
    /// A module in the package's dependency closure resolves to a new version
    ModuleUpdated { module: String },
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeReason::SourceChanged { file } => write!(f, "source changed: {}", file.display()),
            ChangeReason::DependsOnPackage { package } => {
                write!(f, "depends on changed package {}", package)
            }
            ChangeReason::ModuleUpdated { module } => write!(f, "module updated: {}", module),
        }
    }
}

/// Changed packages keyed by import path
///
/// Entries are only ever added; the first recorded reason for a package wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: BTreeMap<String, ChangeReason>,
}

impl ChangeSet {
    /// Creates an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a package as changed. Returns false if it was already present.
    pub fn insert(&mut self, import_path: impl Into<String>, reason: ChangeReason) -> bool {
        let import_path = import_path.into();
        if self.entries.contains_key(&import_path) {
            return false;
        }
        self.entries.insert(import_path, reason);
        true
    }

    /// Returns true if the package is in the set
    pub fn contains(&self, import_path: &str) -> bool {
        self.entries.contains_key(import_path)
    }

    /// Reason recorded for a package
    pub fn reason(&self, import_path: &str) -> Option<&ChangeReason> {
        self.entries.get(import_path)
    }

    /// Number of changed packages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing changed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Import paths in sorted order
    pub fn import_paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
