//! Per-manifest detection of modules whose effective version changed
//!
//! Many packages share one go.mod, so the result for each manifest path is
//! computed once per run and shared through a `OnceMap`.

use crate::cache::OnceMap;
use crate::domain::ManifestSnapshot;
use crate::error::{AppError, PathError};
use crate::manifest::{resolve_versions, GoModParser, ResolvedVersions};
use crate::vcs::{Revision, Vcs};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Module paths whose resolved version differs from the base revision
pub type ChangedModules = Arc<HashSet<String>>;

/// Compares each go.mod in the working tree against the base revision
pub struct ManifestDiffer {
    vcs: Arc<dyn Vcs>,
    base: Revision,
    cache: OnceMap<PathBuf, ChangedModules>,
}

impl ManifestDiffer {
    /// Create a differ comparing the working tree with `base_revision`
    pub fn new(vcs: Arc<dyn Vcs>, base_revision: impl Into<String>) -> Self {
        Self {
            vcs,
            base: Revision::Commit(base_revision.into()),
            cache: OnceMap::new(),
        }
    }

    /// Changed module paths for the go.mod at `manifest_path` (absolute)
    pub async fn changed_modules(&self, manifest_path: &Path) -> Result<ChangedModules, AppError> {
        self.cache
            .get_or_try_init(manifest_path.to_path_buf(), || self.compute(manifest_path))
            .await
    }

    /// Number of manifests resolved so far
    #[cfg(test)]
    pub fn resolved_manifests(&self) -> usize {
        self.cache.len()
    }

    async fn compute(&self, manifest_path: &Path) -> Result<ChangedModules, AppError> {
        let relative = relative_to_root(self.vcs.root(), manifest_path)?;
        let (current, base) = tokio::try_join!(
            self.load(&Revision::WorkingTree, manifest_path, &relative),
            self.load(&self.base, manifest_path, &relative),
        )?;

        let changed = diff_versions(&resolve_versions(&current), &resolve_versions(&base));
        tracing::debug!(
            manifest = %manifest_path.display(),
            changed = changed.len(),
            "resolved manifest diff"
        );
        Ok(Arc::new(changed))
    }

    async fn load(
        &self,
        revision: &Revision,
        manifest_path: &Path,
        relative: &Path,
    ) -> Result<ManifestSnapshot, AppError> {
        let content = self.vcs.read_file(revision, relative).await?;
        Ok(GoModParser.parse(manifest_path, &content)?)
    }
}

/// Modules required by `current` whose resolved version is new or different
///
/// Only `current` is scanned: a module required at the base revision but no
/// longer required now is not reported.
pub fn diff_versions(current: &ResolvedVersions, base: &ResolvedVersions) -> HashSet<String> {
    current
        .iter()
        .filter(|(module, version)| base.get(*module) != Some(*version))
        .map(|(module, _)| module.clone())
        .collect()
}

/// `path` relative to `root`, rejecting anything outside the repository
fn relative_to_root(root: &Path, path: &Path) -> Result<PathBuf, PathError> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| PathError::outside_root(path, root))
}
