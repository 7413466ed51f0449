//! go.mod parser
//!
//! Handles:
//! - `module`, `go`, `toolchain`, `godebug`, `tool`, `ignore` directives
//! - `require`, `exclude`, `replace`, `retract` statements (single and block)
//! - `//` comments
//! - double-quoted and back-quoted module paths
//!
//! Only requirements and replacements end up in the snapshot; the other
//! directives are validated and skipped.

use crate::domain::{ManifestSnapshot, ModuleVersion, Replacement, Requirement};
use crate::error::ManifestError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Parser for go.mod files
pub struct GoModParser;

// Module versions: v1, v1.2, v1.2.3, v1.2.3-beta.1, v0.0.0-20210101120000-abcdef123456,
// v2.0.0+incompatible. Shorthand forms take no prerelease or build suffix.
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^v(?P<major>0|[1-9]\d*)",
        r"(?:\.(?P<minor>0|[1-9]\d*)",
        r"(?:\.(?P<patch>0|[1-9]\d*)",
        r"(?P<pre>-(?:0|[1-9]\d*|\d*[A-Za-z-][0-9A-Za-z-]*)(?:\.(?:0|[1-9]\d*|\d*[A-Za-z-][0-9A-Za-z-]*))*)?",
        r"(?P<build>\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?",
        r")?)?$",
    ))
    .unwrap()
});

// Go language versions: 1.21, 1.21.0, 1.22rc1
static GO_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9]\d*\.(0|[1-9]\d*)(\.(0|[1-9]\d*))?([a-z]+\d+)?$").unwrap());

const DIRECTIVES: &[&str] = &[
    "module",
    "go",
    "toolchain",
    "godebug",
    "require",
    "exclude",
    "replace",
    "retract",
    "tool",
    "ignore",
];

impl GoModParser {
    /// Parse go.mod content read from `path`
    pub fn parse(&self, path: &Path, content: &[u8]) -> Result<ManifestSnapshot, ManifestError> {
        let text = std::str::from_utf8(content)
            .map_err(|e| ManifestError::parse(path, 1, format!("invalid UTF-8: {}", e)))?;

        let mut snapshot = ManifestSnapshot::new(path);
        let mut block: Option<(String, usize)> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let tokens = tokenize(raw).map_err(|m| ManifestError::parse(path, line_no, m))?;
            if tokens.is_empty() {
                continue;
            }

            if let Some((verb, _)) = &block {
                if tokens == [")"] {
                    block = None;
                    continue;
                }
                if has_paren(&tokens) {
                    return Err(ManifestError::parse(
                        path,
                        line_no,
                        "unexpected parenthesis inside block",
                    ));
                }
                let verb = verb.clone();
                apply(&mut snapshot, &verb, &tokens)
                    .map_err(|m| ManifestError::parse(path, line_no, m))?;
                continue;
            }

            let verb = tokens[0].as_str();
            if verb == ")" {
                return Err(ManifestError::parse(path, line_no, "unexpected ')'"));
            }
            if !DIRECTIVES.contains(&verb) {
                return Err(ManifestError::parse(
                    path,
                    line_no,
                    format!("unknown directive: {}", verb),
                ));
            }

            let args = &tokens[1..];
            if args.len() == 1 && args[0] == "(" {
                block = Some((verb.to_string(), line_no));
                continue;
            }
            if has_paren(args) {
                return Err(ManifestError::parse(
                    path,
                    line_no,
                    format!("unexpected parenthesis in {} statement", verb),
                ));
            }
            apply(&mut snapshot, verb, args)
                .map_err(|m| ManifestError::parse(path, line_no, m))?;
        }

        if let Some((verb, start)) = block {
            return Err(ManifestError::parse(
                path,
                start,
                format!("unterminated {} block", verb),
            ));
        }

        Ok(snapshot)
    }
}

fn has_paren(tokens: &[String]) -> bool {
    tokens.iter().any(|t| t == "(" || t == ")")
}

/// Apply one statement to the snapshot. `args` excludes the directive verb.
fn apply(
    snapshot: &mut ManifestSnapshot,
    verb: &str,
    args: &[String],
) -> Result<(), String> {
    match verb {
        "module" => {
            let [path] = args else {
                return Err("usage: module module/path".to_string());
            };
            if snapshot.module.is_some() {
                return Err("repeated module statement".to_string());
            }
            snapshot.module = Some(path.clone());
        }
        "go" => {
            let [version] = args else {
                return Err("usage: go 1.23".to_string());
            };
            if !GO_VERSION_RE.is_match(version) {
                return Err(format!("invalid go version '{}'", version));
            }
        }
        "toolchain" | "tool" | "ignore" => {
            if args.len() != 1 {
                return Err(format!("usage: {} value", verb));
            }
        }
        "godebug" | "retract" => {
            if args.is_empty() {
                return Err(format!("usage: {} value", verb));
            }
        }
        "require" | "exclude" => {
            let [path, version] = args else {
                return Err(format!("usage: {} module/path v1.2.3", verb));
            };
            let version = canonical_version(version)?;
            if verb == "require" {
                snapshot
                    .requires
                    .push(Requirement::new(path.as_str(), version));
            }
        }
        "replace" => {
            snapshot.replacements.push(parse_replace(args)?);
        }
        _ => return Err(format!("unknown directive: {}", verb)),
    }
    Ok(())
}

/// `old [version] => new [version]`
fn parse_replace(args: &[String]) -> Result<Replacement, String> {
    const USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4\n\t or replace module/path [v1.2.3] => ../local/directory";

    let arrow = match args.iter().position(|t| t == "=>") {
        Some(pos @ (1 | 2)) => pos,
        _ => return Err(USAGE.to_string()),
    };
    let target = &args[arrow + 1..];
    if target.is_empty() || target.len() > 2 {
        return Err(USAGE.to_string());
    }

    let old_version = if arrow == 2 {
        canonical_version(&args[1])?
    } else {
        String::new()
    };
    let old = ModuleVersion::new(args[0].as_str(), old_version);

    let new_path = &target[0];
    let new_version = match (target.get(1), is_directory_path(new_path)) {
        (None, true) => String::new(),
        (Some(_), true) => {
            return Err("replacement module directory path must not have version".to_string());
        }
        (None, false) => {
            return Err(
                "replacement module without version must be directory path (rooted or starting with ./ or ../)"
                    .to_string(),
            );
        }
        (Some(version), false) => canonical_version(version)?,
    };

    Ok(Replacement::new(
        old,
        ModuleVersion::new(new_path.as_str(), new_version),
    ))
}

/// Canonical form of a module version, as the go command stores it
///
/// `v1` and `v1.2` expand to `v1.0.0` and `v1.2.0`. Build metadata is
/// dropped, except `+incompatible`.
fn canonical_version(version: &str) -> Result<String, String> {
    let Some(caps) = VERSION_RE.captures(version) else {
        return Err(format!(
            "invalid version '{}': must be of the form v1.2.3",
            version
        ));
    };

    let part = |name: &str| caps.name(name).map_or("0", |m| m.as_str());
    let mut canonical = format!("v{}.{}.{}", part("major"), part("minor"), part("patch"));
    if let Some(pre) = caps.name("pre") {
        canonical.push_str(pre.as_str());
    }
    if caps.name("build").is_some_and(|b| b.as_str() == "+incompatible") {
        canonical.push_str("+incompatible");
    }
    Ok(canonical)
}

fn is_directory_path(path: &str) -> bool {
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with('/')
        || path.starts_with(".\\")
        || path.starts_with("..\\")
}

/// Split a line into tokens, stopping at a `//` comment
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut rest = line;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if rest.starts_with("//") {
            break;
        }

        let first = rest.chars().next().unwrap_or_default();
        match first {
            '(' | ')' => {
                tokens.push(first.to_string());
                rest = &rest[1..];
            }
            '"' => {
                let (token, remaining) = read_interpreted(&rest[1..])?;
                tokens.push(token);
                rest = remaining;
            }
            '`' => {
                let end = rest[1..]
                    .find('`')
                    .ok_or_else(|| "unterminated raw string".to_string())?;
                tokens.push(rest[1..1 + end].to_string());
                rest = &rest[end + 2..];
            }
            _ => {
                let end = rest
                    .char_indices()
                    .find(|&(i, c)| {
                        c.is_whitespace()
                            || matches!(c, '(' | ')' | '"' | '`')
                            || rest[i..].starts_with("//")
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                tokens.push(rest[..end].to_string());
                rest = &rest[end..];
            }
        }
    }

    Ok(tokens)
}

/// Read a double-quoted string body, returning it unescaped with the remainder
fn read_interpreted(body: &str) -> Result<(String, &str), String> {
    let mut token = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((token, &body[i + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped)) => token.push(escaped),
                None => break,
            },
            _ => token.push(c),
        }
    }
    Err("unterminated quoted string".to_string())
}
