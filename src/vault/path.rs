//! Vault path strings: always forward slashes, no leading or trailing separator,
//! `/` standing for the vault root.

use unicode_normalization::UnicodeNormalization;

pub const ROOT: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Directory part including its trailing separator, e.g. `one/two/`.
    pub dir: String,
    /// Last component, `Untitled` when empty.
    pub name: String,
}

/// Canonical form of a vault path.
///
/// ```text
/// normalize_path("\\one//two/") == "one/two"
/// normalize_path("") == "/"
/// ```
pub fn normalize_path(path: &str) -> String {
    let folded: String = path
        .replace('\u{00A0}', " ")
        .replace('\\', "/")
        .nfc()
        .collect();
    let joined = folded
        .split('/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        ROOT.to_string()
    } else {
        joined
    }
}

/// True when a `..` segment would take the path above the folder it is applied to.
pub fn climbs_up(path: &str) -> bool {
    normalize_path(path).split('/').any(|part| part == "..")
}

/// Joins parts with `/` and normalizes the result.
pub fn join<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .map(|p| p.as_ref().trim())
        .collect::<Vec<_>>()
        .join("/");
    normalize_path(&joined)
}

/// Splits a path into its directory and last component.
pub fn parse(path: &str) -> ParsedPath {
    let split = path.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let (dir, name) = path.split_at(split);
    ParsedPath {
        dir: dir.to_string(),
        name: if name.is_empty() { "Untitled".to_string() } else { name.to_string() },
    }
}

/// Every ancestor of a path, shallowest first, the path itself last.
///
/// ```text
/// sub_paths("/one/two/three/") == ["one", "one/two", "one/two/three"]
/// ```
pub fn sub_paths(path: &str) -> Vec<String> {
    let normalized = normalize_path(path);
    if normalized == ROOT {
        return Vec::new();
    }
    let parts: Vec<&str> = normalized.split('/').filter(|p| !p.trim().is_empty()).collect();
    (1..=parts.len()).map(|n| parts[..n].join("/")).collect()
}

/// Applies `rel` to the folder `dir`, honouring `.` and `..`.
/// Returns `None` when `..` would climb above the vault root.
pub fn resolve_relative(dir: &str, rel: &str) -> Option<String> {
    let mut stack: Vec<&str> = if dir == ROOT {
        Vec::new()
    } else {
        dir.split('/').filter(|p| !p.is_empty()).collect()
    };
    for part in rel.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            other => stack.push(other),
        }
    }
    Some(normalize_path(&stack.join("/")))
}

/// Folder part of a vault path; `/` for top-level entries.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) if idx > 0 => &path[..idx],
        _ => ROOT,
    }
}
