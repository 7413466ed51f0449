//! Build toolchain access
//!
//! This module provides:
//! - The `PackageLister` trait that produces the build-unit snapshot
//! - `GoList`, the implementation backed by `go list -json`

mod go_list;

pub use go_list::{GoList, DEFAULT_GO};

use crate::domain::BuildUnit;
use crate::error::ToolError;
use async_trait::async_trait;
use std::path::Path;

/// Lists the build units of one module
///
/// Implementations must return each unit's `deps` already transitively
/// closed. The detector decides propagation in a single pass and never
/// follows a dependency's own dependencies.
#[async_trait]
pub trait PackageLister: Send + Sync {
    /// All packages under `module_dir`
    async fn list_build_units(&self, module_dir: &Path) -> Result<Vec<BuildUnit>, ToolError>;
}
