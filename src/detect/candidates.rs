//! Mapping a package import path to the modules that could own it
//!
//! go.mod lists modules, while a package's dependency closure lists
//! packages. A package belongs to the module whose path is the longest
//! prefix of its import path, so every `/`-delimited prefix is a candidate.

/// Progressively shorter prefixes of `import_path`, itself first
///
/// `github.com/org/repo/sub/pkg` yields `github.com/org/repo/sub/pkg`,
/// `github.com/org/repo/sub`, `github.com/org/repo`, `github.com/org`,
/// `github.com`. An empty path yields nothing.
pub fn owning_candidates(import_path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(import_path).filter(|p| !p.is_empty()), |&path| {
        path.rfind('/').map(|i| &path[..i]).filter(|p| !p.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_prefixes_longest_first() {
        let candidates: Vec<_> = owning_candidates("github.com/org/repo/sub/pkg").collect();
        assert_eq!(
            candidates,
            vec![
                "github.com/org/repo/sub/pkg",
                "github.com/org/repo/sub",
                "github.com/org/repo",
                "github.com/org",
                "github.com",
            ]
        );
    }

    #[test]
    fn test_single_segment() {
        let candidates: Vec<_> = owning_candidates("fmt").collect();
        assert_eq!(candidates, vec!["fmt"]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(owning_candidates("").count(), 0);
    }

    #[test]
    fn test_leading_slash_stops_at_empty_prefix() {
        let candidates: Vec<_> = owning_candidates("/a/b").collect();
        assert_eq!(candidates, vec!["/a/b", "/a"]);
    }
}
