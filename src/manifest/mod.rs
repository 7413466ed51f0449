//! go.mod handling
//!
//! This module provides functionality to:
//! - Discover go.mod files in a repository
//! - Parse go.mod content into a `ManifestSnapshot`
//! - Resolve effective module versions after `replace` directives
//! - Diff the working tree manifest against a base revision, once per manifest

mod detector;
mod differ;
mod go_mod;
mod resolver;

pub use detector::{find_manifests, find_module_dirs, GO_MOD};
pub use differ::{diff_versions, ChangedModules, ManifestDiffer};
pub use go_mod::GoModParser;
pub use resolver::{resolve_versions, ResolvedVersions};
