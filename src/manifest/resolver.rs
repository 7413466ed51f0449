//! Effective version resolution for a parsed go.mod
//!
//! Each requirement is mapped to a single string `path@version` describing
//! what the build will actually use once `replace` directives are applied.

use crate::domain::{ManifestSnapshot, ModuleVersion};
use std::collections::HashMap;

/// Module path → effective `target@version` string
pub type ResolvedVersions = HashMap<String, String>;

/// Resolve every requirement of `snapshot` against its replacements
///
/// Lookup order per requirement: an exact `(path, version)` replacement,
/// then a wildcard `(path, "")` replacement. When several directives share
/// the same key the last one in the file wins. A target without a version
/// (a local directory) keeps the originally required version.
pub fn resolve_versions(snapshot: &ManifestSnapshot) -> ResolvedVersions {
    let mut replacements: HashMap<&ModuleVersion, &ModuleVersion> = HashMap::new();
    for replacement in &snapshot.replacements {
        replacements.insert(&replacement.old, &replacement.new);
    }

    let mut resolved = ResolvedVersions::with_capacity(snapshot.requires.len());
    for requirement in &snapshot.requires {
        let required = &requirement.module;
        let target = replacements.get(required).copied().or_else(|| {
            if required.is_wildcard() {
                None
            } else {
                replacements.get(&ModuleVersion::any(required.path.as_str())).copied()
            }
        });

        let effective = match target {
            Some(new) if !new.version.is_empty() => format!("{}@{}", new.path, new.version),
            Some(new) => format!("{}@{}", new.path, required.version),
            None => required.to_string(),
        };
        resolved.insert(required.path.clone(), effective);
    }
    resolved
}
