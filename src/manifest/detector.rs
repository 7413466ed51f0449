//! go.mod discovery
//!
//! Walks the repository looking for module roots. Directories the go command
//! itself ignores (`vendor`, `testdata`, names starting with `.` or `_`) are
//! skipped, as is anything that cannot be read.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Manifest filename for Go modules
pub const GO_MOD: &str = "go.mod";

/// Find every go.mod under `dir`, sorted by path
pub fn find_manifests(dir: &Path) -> Vec<PathBuf> {
    let mut manifests: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored_entry(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == GO_MOD)
        .map(DirEntry::into_path)
        .collect();
    manifests.sort();
    manifests
}

/// Module directories (the parents of `find_manifests`)
pub fn find_module_dirs(dir: &Path) -> Vec<PathBuf> {
    find_manifests(dir)
        .into_iter()
        .filter_map(|p| p.parent().map(Path::to_path_buf))
        .collect()
}

fn is_ignored_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && is_ignored_dir(&entry.file_name().to_string_lossy())
}

fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || name == "vendor" || name == "testdata"
}
