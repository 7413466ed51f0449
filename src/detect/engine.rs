//! Change propagation over a package snapshot
//!
//! Workflow: changed files → package listing → direct changes → manifest
//! diffs → propagated changes.
//!
//! Propagation is not a fixpoint. Every package's `deps` is already the full
//! transitive closure, so a package is affected exactly when it has a changed
//! source file itself, or its closure contains a package or module that does.
//! Each step below reads only results of the step before it, which keeps the
//! outcome independent of package order.

use crate::config::DetectorConfig;
use crate::detect::{owning_candidates, ChangedFileSet};
use crate::domain::{BuildUnit, ChangeReason, ChangeSet};
use crate::error::AppError;
use crate::manifest::{find_module_dirs, ManifestDiffer};
use crate::toolchain::PackageLister;
use crate::vcs::Vcs;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// A package reported as changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedPackage {
    /// Import path of the package
    pub import_path: String,
    /// Full path to the package directory
    pub dir: PathBuf,
    /// First reason the package was classified as changed
    pub reason: ChangeReason,
}

/// Result of a detection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// Revision the working tree was compared against
    #[serde(rename = "base")]
    pub base_revision: String,
    /// Changed packages sorted by import path
    pub packages: Vec<ChangedPackage>,
}

impl Detection {
    /// Import paths of the changed packages
    pub fn import_paths(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.import_path.as_str()).collect()
    }
}

/// Orchestrates one detection run
pub struct ChangeDetector {
    config: DetectorConfig,
    vcs: Arc<dyn Vcs>,
    lister: Arc<dyn PackageLister>,
    differ: Arc<ManifestDiffer>,
}

impl ChangeDetector {
    /// Create a detector using the given collaborators
    pub fn new(config: DetectorConfig, vcs: Arc<dyn Vcs>, lister: Arc<dyn PackageLister>) -> Self {
        let differ = Arc::new(ManifestDiffer::new(
            Arc::clone(&vcs),
            config.base_revision.as_str(),
        ));
        Self {
            config,
            vcs,
            lister,
            differ,
        }
    }

    /// Run detection end to end
    pub async fn run(&self) -> Result<Detection, AppError> {
        let changed = self.vcs.changed_files(&self.config.base_revision).await?;
        let files = ChangedFileSet::from_relative(&self.config.repo_root, &changed);
        tracing::info!(
            base = %self.config.base_revision,
            changed = changed.len(),
            sources = files.len(),
            "collected changed files"
        );

        let units = self.list_build_units().await?;
        tracing::info!(packages = units.len(), "listed packages");

        let changes = self.detect(&units, &files).await?;
        tracing::info!(changed = changes.len(), "detection finished");

        let mut packages: Vec<ChangedPackage> = units
            .iter()
            .filter_map(|unit| {
                changes
                    .reason(&unit.import_path)
                    .map(|reason| ChangedPackage {
                        import_path: unit.import_path.clone(),
                        dir: unit.dir.clone(),
                        reason: reason.clone(),
                    })
            })
            .collect();
        packages.sort_by(|a, b| a.import_path.cmp(&b.import_path));
        packages.dedup_by(|a, b| a.import_path == b.import_path);

        Ok(Detection {
            base_revision: self.config.base_revision.clone(),
            packages,
        })
    }

    /// Classify `units` given the modified source files
    pub async fn detect(
        &self,
        units: &[BuildUnit],
        files: &ChangedFileSet,
    ) -> Result<ChangeSet, AppError> {
        let mut changes = ChangeSet::new();

        // Direct: own source files modified
        for unit in units {
            if let Some(file) = unit.source_paths().find(|path| files.contains(path)) {
                tracing::debug!(package = %unit.import_path, file = %file.display(), "source changed");
                changes.insert(unit.import_path.as_str(), ChangeReason::SourceChanged { file });
            }
        }

        let pending: Vec<&BuildUnit> = units
            .iter()
            .filter(|unit| !changes.contains(&unit.import_path))
            .collect();
        let without_module = pending
            .iter()
            .filter(|unit| unit.manifest_path().is_none())
            .count();
        if without_module > 0 {
            tracing::warn!(
                packages = without_module,
                "packages without a go.mod are only checked for changes in this repository"
            );
        }
        self.resolve_manifests(&pending).await?;

        // External: a module in the closure resolves to a different version
        let mut module_hits = Vec::new();
        for unit in &pending {
            if let Some(module) = self.updated_module(unit).await? {
                module_hits.push((unit.import_path.as_str(), module));
            }
        }
        for (import_path, module) in module_hits {
            tracing::debug!(package = import_path, module = %module, "module updated");
            changes.insert(import_path, ChangeReason::ModuleUpdated { module });
        }

        // Same tree: the closure contains a package changed by either rule above
        let propagated: Vec<(&str, &str)> = pending
            .iter()
            .filter(|unit| !changes.contains(&unit.import_path))
            .filter_map(|unit| {
                unit.deps
                    .iter()
                    .find(|dep| changes.contains(dep))
                    .map(|dep| (unit.import_path.as_str(), dep.as_str()))
            })
            .collect();
        for (import_path, dep) in propagated {
            tracing::debug!(package = import_path, dependency = dep, "depends on changed package");
            changes.insert(
                import_path,
                ChangeReason::DependsOnPackage {
                    package: dep.to_string(),
                },
            );
        }

        Ok(changes)
    }

    /// First module in the unit's closure whose version changed in its go.mod
    async fn updated_module(&self, unit: &BuildUnit) -> Result<Option<String>, AppError> {
        let Some(manifest) = unit.manifest_path() else {
            tracing::debug!(package = %unit.import_path, "no go.mod, skipping module check");
            return Ok(None);
        };
        let changed = self.differ.changed_modules(manifest).await?;
        if changed.is_empty() {
            return Ok(None);
        }

        Ok(unit.deps.iter().find_map(|dep| {
            owning_candidates(dep)
                .find(|candidate| changed.contains(*candidate))
                .map(str::to_string)
        }))
    }

    /// Diff every distinct go.mod of `units` concurrently, filling the cache
    async fn resolve_manifests(&self, units: &[&BuildUnit]) -> Result<(), AppError> {
        let manifests: BTreeSet<PathBuf> = units
            .iter()
            .filter_map(|unit| unit.manifest_path().map(PathBuf::from))
            .collect();

        let mut tasks = JoinSet::new();
        for manifest in manifests {
            let differ = Arc::clone(&self.differ);
            tasks.spawn(async move { differ.changed_modules(&manifest).await.map(|_| ()) });
        }
        while let Some(result) = tasks.join_next().await {
            result??;
        }
        Ok(())
    }

    /// Packages of every configured (or discovered) module, in module order
    async fn list_build_units(&self) -> Result<Vec<BuildUnit>, AppError> {
        let module_dirs = if self.config.module_paths.is_empty() {
            find_module_dirs(&self.config.repo_root)
        } else {
            self.config.module_paths.clone()
        };
        tracing::debug!(modules = module_dirs.len(), "listing packages");

        let mut tasks = JoinSet::new();
        for (index, dir) in module_dirs.into_iter().enumerate() {
            let lister = Arc::clone(&self.lister);
            tasks.spawn(async move {
                lister
                    .list_build_units(&dir)
                    .await
                    .map(|units| (index, units))
            });
        }

        let mut listed = Vec::with_capacity(tasks.len());
        while let Some(result) = tasks.join_next().await {
            listed.push(result??);
        }
        listed.sort_by_key(|(index, _)| *index);
        Ok(listed.into_iter().flat_map(|(_, units)| units).collect())
    }
}

/// Detect the packages affected by changes since `config.base_revision`
pub async fn detect_changed_packages(
    config: &DetectorConfig,
    vcs: Arc<dyn Vcs>,
    lister: Arc<dyn PackageLister>,
) -> Result<Detection, AppError> {
    ChangeDetector::new(config.clone(), vcs, lister).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryLister, MemoryVcs};
    use crate::vcs::Revision;
    use std::path::Path;

    const BASE: &str = "HEAD~";
    const ROOT: &str = "/repo";

    const GO_MOD: &str = "module example.com/repo\n\ngo 1.22\n\nrequire (\n\tgithub.com/org/lib v1.0.0\n\tgithub.com/other/util v0.3.0\n)\n";
    const GO_MOD_BUMPED: &str = "module example.com/repo\n\ngo 1.22\n\nrequire (\n\tgithub.com/org/lib v1.1.0\n\tgithub.com/other/util v0.3.0\n)\n";

    fn unit(name: &str) -> BuildUnit {
        BuildUnit::new(format!("example.com/repo/{}", name), format!("{}/{}", ROOT, name))
            .with_files([format!("{}.go", name)])
            .with_module("example.com/repo", format!("{}/go.mod", ROOT))
    }

    fn detector(vcs: MemoryVcs) -> (ChangeDetector, Arc<MemoryVcs>) {
        let vcs = Arc::new(vcs);
        let config = DetectorConfig::new(ROOT).unwrap();
        let detector = ChangeDetector::new(config, vcs.clone(), Arc::new(MemoryLister::new()));
        (detector, vcs)
    }

    fn unchanged_manifest() -> MemoryVcs {
        MemoryVcs::new(ROOT).with_unchanged_file(BASE, "go.mod", GO_MOD)
    }

    fn bumped_manifest() -> MemoryVcs {
        MemoryVcs::new(ROOT)
            .with_file(Revision::WorkingTree, "go.mod", GO_MOD_BUMPED)
            .with_file(Revision::Commit(BASE.to_string()), "go.mod", GO_MOD)
    }

    fn files(paths: &[&str]) -> ChangedFileSet {
        ChangedFileSet::from_relative(Path::new(ROOT), paths)
    }

    #[tokio::test]
    async fn test_direct_change_only_marks_owner() {
        let (detector, _) = detector(unchanged_manifest());
        let a = unit("a");
        let b = unit("b").with_deps(["example.com/repo/a"]);

        let changes = detector.detect(&[a, b], &files(&["b/b.go"])).await.unwrap();
        assert_eq!(changes.import_paths(), vec!["example.com/repo/b"]);
        assert!(matches!(
            changes.reason("example.com/repo/b"),
            Some(ChangeReason::SourceChanged { .. })
        ));
    }

    #[tokio::test]
    async fn test_dependency_on_changed_package_propagates() {
        let (detector, _) = detector(unchanged_manifest());
        let a = unit("a");
        let b = unit("b").with_deps(["example.com/repo/a"]);

        let changes = detector.detect(&[b, a], &files(&["a/a.go"])).await.unwrap();
        assert_eq!(
            changes.import_paths(),
            vec!["example.com/repo/a", "example.com/repo/b"]
        );
        assert_eq!(
            changes.reason("example.com/repo/b"),
            Some(&ChangeReason::DependsOnPackage {
                package: "example.com/repo/a".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_three_level_chain_needs_single_pass() {
        let (detector, _) = detector(unchanged_manifest());
        // top → mid → leaf, with the closure already flattened into top
        let top = unit("top").with_deps(["example.com/repo/mid", "example.com/repo/leaf"]);
        let mid = unit("mid").with_deps(["example.com/repo/leaf"]);
        let leaf = unit("leaf");

        let changes = detector
            .detect(&[top, mid, leaf], &files(&["leaf/leaf.go"]))
            .await
            .unwrap();
        assert_eq!(changes.len(), 3);
    }

    #[tokio::test]
    async fn test_unrelated_packages_are_untouched() {
        let (detector, _) = detector(bumped_manifest());
        let a = unit("a").with_deps(["fmt", "github.com/other/util"]);
        let b = unit("b").with_deps(["example.com/repo/a"]);

        let changes = detector.detect(&[a, b], &files(&["README.md"])).await.unwrap();
        assert!(changes.is_empty());
    }

    #[tokio::test]
    async fn test_nested_package_of_updated_module() {
        let (detector, _) = detector(bumped_manifest());
        let a = unit("a").with_deps(["github.com/org/lib/sub/pkg", "strings"]);

        let changes = detector.detect(&[a], &files(&[])).await.unwrap();
        assert_eq!(
            changes.reason("example.com/repo/a"),
            Some(&ChangeReason::ModuleUpdated {
                module: "github.com/org/lib".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_module_update_propagates_to_dependents_in_other_modules() {
        // tools/ has its own go.mod that did not change, but imports a package
        // from the root module that picked up a new library version
        let vcs = bumped_manifest().with_unchanged_file(
            BASE,
            "tools/go.mod",
            "module example.com/repo/tools\n\nrequire example.com/repo v0.0.0\n\nreplace example.com/repo => ../\n",
        );
        let (detector, _) = detector(vcs);

        let tool = BuildUnit::new("example.com/repo/tools/gen", "/repo/tools/gen")
            .with_files(["gen.go"])
            .with_deps(["example.com/repo/a", "github.com/org/lib"])
            .with_module("example.com/repo/tools", "/repo/tools/go.mod");
        let a = unit("a").with_deps(["github.com/org/lib"]);

        // Package order must not matter
        for units in [vec![tool.clone(), a.clone()], vec![a.clone(), tool.clone()]] {
            let changes = detector.detect(&units, &files(&[])).await.unwrap();
            assert_eq!(
                changes.import_paths(),
                vec!["example.com/repo/a", "example.com/repo/tools/gen"]
            );
        }
    }

    #[tokio::test]
    async fn test_removed_module_is_not_a_change() {
        let vcs = MemoryVcs::new(ROOT)
            .with_file(
                Revision::WorkingTree,
                "go.mod",
                "module example.com/repo\n\nrequire github.com/org/lib v1.0.0\n",
            )
            .with_file(Revision::Commit(BASE.to_string()), "go.mod", GO_MOD);
        let (detector, _) = detector(vcs);
        let a = unit("a").with_deps(["github.com/other/util"]);

        let changes = detector.detect(&[a], &files(&[])).await.unwrap();
        assert!(changes.is_empty());
    }

    #[tokio::test]
    async fn test_shared_manifest_is_read_once_per_revision() {
        let (detector, vcs) = detector(unchanged_manifest());
        let units: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| unit(name).with_deps(["github.com/org/lib"]))
            .collect();

        detector.detect(&units, &files(&[])).await.unwrap();
        assert_eq!(vcs.read_count(&Revision::WorkingTree, "go.mod"), 1);
        assert_eq!(
            vcs.read_count(&Revision::Commit(BASE.to_string()), "go.mod"),
            1
        );
    }

    #[tokio::test]
    async fn test_directly_changed_packages_skip_manifest_reads() {
        let (detector, vcs) = detector(MemoryVcs::new(ROOT));
        let a = unit("a");

        let changes = detector.detect(&[a], &files(&["a/a.go"])).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(vcs.total_reads(), 0);
    }

    #[tokio::test]
    async fn test_package_without_module_uses_same_tree_rule_only() {
        let (detector, vcs) = detector(MemoryVcs::new(ROOT));
        let a = unit("a");
        let gopath = BuildUnit::new("legacy/tool", "/repo/legacy/tool")
            .with_deps(["example.com/repo/a", "github.com/org/lib"]);

        let changes = detector
            .detect(&[a, gopath], &files(&["a/a.go"]))
            .await
            .unwrap();
        assert!(changes.contains("legacy/tool"));
        assert_eq!(vcs.total_reads(), 0);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_packages_without_module_warn_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (detector, _) = detector(MemoryVcs::new(ROOT));
        let units: Vec<BuildUnit> = (0..5)
            .map(|i| {
                BuildUnit::new(format!("legacy/pkg{}", i), format!("/repo/legacy/pkg{}", i))
                    .with_deps(["github.com/org/lib"])
            })
            .collect();
        let changes = detector.detect(&units, &files(&[])).await.unwrap();
        assert!(changes.is_empty());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("WARN").count(), 1);
        assert!(output.contains("packages=5"));
    }

    #[tokio::test]
    async fn test_malformed_manifest_aborts() {
        let vcs = MemoryVcs::new(ROOT).with_unchanged_file(BASE, "go.mod", "module\n");
        let (detector, _) = detector(vcs);

        let result = detector.detect(&[unit("a")], &files(&[])).await;
        assert!(matches!(result, Err(AppError::Manifest(_))));
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let vcs = Arc::new(unchanged_manifest().with_changed(["b/b.go", "docs/notes.md"]));
        let lister = MemoryLister::new().with_module(
            ROOT,
            vec![unit("a"), unit("b").with_deps(["example.com/repo/a"])],
        );
        let config = DetectorConfig::new(ROOT)
            .unwrap()
            .with_module_paths([ROOT])
            .unwrap();

        let detection = detect_changed_packages(&config, vcs, Arc::new(lister))
            .await
            .unwrap();
        assert_eq!(detection.base_revision, "HEAD~");
        assert_eq!(detection.import_paths(), vec!["example.com/repo/b"]);
        assert_eq!(detection.packages[0].dir, PathBuf::from("/repo/b"));
    }

    #[tokio::test]
    async fn test_run_lists_modules_in_configured_order() {
        let vcs = Arc::new(
            unchanged_manifest()
                .with_unchanged_file(BASE, "svc/go.mod", "module example.com/svc\n")
                .with_changed(["svc/api/api.go", "a/a.go"]),
        );
        let svc = BuildUnit::new("example.com/svc/api", "/repo/svc/api")
            .with_files(["api.go"])
            .with_module("example.com/svc", "/repo/svc/go.mod");
        let lister = MemoryLister::new()
            .with_module("/repo/svc", vec![svc])
            .with_module(ROOT, vec![unit("a")]);
        let config = DetectorConfig::new(ROOT)
            .unwrap()
            .with_module_paths(["/repo/svc", ROOT])
            .unwrap();

        let detection = detect_changed_packages(&config, vcs, Arc::new(lister))
            .await
            .unwrap();
        assert_eq!(
            detection.import_paths(),
            vec!["example.com/repo/a", "example.com/svc/api"]
        );
    }

    #[tokio::test]
    async fn test_run_fails_on_lister_error() {
        let vcs = Arc::new(unchanged_manifest());
        let config = DetectorConfig::new(ROOT)
            .unwrap()
            .with_module_paths(["/repo/missing"])
            .unwrap();

        let result = detect_changed_packages(&config, vcs, Arc::new(MemoryLister::new())).await;
        assert!(matches!(result, Err(AppError::Tool(_))));
    }
}
