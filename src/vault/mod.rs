//! The notes folder on disk.

pub mod directory;
pub mod links;
pub mod path;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::host::{FileRef, FolderNode};
use path::{climbs_up, normalize_path, resolve_relative, ROOT};

pub use directory::ensure_directory;

const NOTE_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("'{0}' not found")]
    NotFound(String),

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("'{0}' is outside the vault")]
    OutsideVault(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl VaultError {
    fn io(path: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => VaultError::NotFound(path.to_string()),
            io::ErrorKind::AlreadyExists => VaultError::AlreadyExists(path.to_string()),
            _ => VaultError::Io { path: path.to_string(), source },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    show_hidden_folders: bool,
}

impl Vault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VaultError::NotFound(root.display().to_string()));
        }
        Ok(Self { root, show_hidden_folders: false })
    }

    pub fn with_hidden_folders(mut self, show: bool) -> Self {
        self.show_hidden_folders = show;
        self
    }

    /// Absolute location of a vault path.
    pub fn abs(&self, rel: &str) -> PathBuf {
        let rel = normalize_path(rel);
        if rel == ROOT {
            self.root.clone()
        } else {
            rel.split('/').fold(self.root.clone(), |acc, part| acc.join(part))
        }
    }

    /// Vault path of an absolute location, `None` when it lies elsewhere.
    pub fn relative(&self, abs: &Path) -> Option<String> {
        let rel = abs.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(normalize_path(&parts.join("/")))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.abs(rel).exists()
    }

    pub fn read(&self, rel: &str) -> Result<String, VaultError> {
        fs::read_to_string(self.abs(rel)).map_err(|e| VaultError::io(rel, e))
    }

    pub fn write(&self, rel: &str, content: &str) -> Result<(), VaultError> {
        fs::write(self.abs(rel), content).map_err(|e| VaultError::io(rel, e))
    }

    /// Creates the folder and any missing parents; an existing folder is fine.
    pub fn mkdir(&self, rel: &str) -> Result<(), VaultError> {
        if climbs_up(rel) {
            return Err(VaultError::OutsideVault(rel.to_string()));
        }
        let abs = self.abs(rel);
        if abs.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&abs).map_err(|e| VaultError::io(rel, e))?;
        info!(dir = rel, "mkdir");
        Ok(())
    }

    /// Every visible file, sorted by path.
    pub fn files(&self) -> Vec<String> {
        let mut files = Vec::new();
        self.walk(&self.root, &mut |entry, is_dir| {
            if !is_dir {
                files.push(entry);
            }
        });
        files.sort();
        files
    }

    /// Markdown notes only, sorted by path.
    pub fn notes(&self) -> Vec<String> {
        self.files().into_iter().filter(|f| is_note(f)).collect()
    }

    /// Folders in pre-order, the root first and siblings by name.
    pub fn folders(&self) -> Vec<FolderNode> {
        let mut folders = vec![FolderNode::root()];
        self.walk(&self.root, &mut |entry, is_dir| {
            if is_dir {
                let name = entry.rsplit('/').next().unwrap_or(&entry).to_string();
                folders.push(FolderNode { path: entry, name });
            }
        });
        folders
    }

    fn walk(&self, dir: &Path, visit: &mut dyn FnMut(String, bool)) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        let mut entries: Vec<_> = entries.flatten().map(|e| e.path()).collect();
        entries.sort();

        for path in entries {
            let hidden = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(false);
            let Some(rel) = self.relative(&path) else {
                continue;
            };
            if path.is_dir() {
                if hidden && !self.show_hidden_folders {
                    continue;
                }
                visit(rel, true);
                self.walk(&path, visit);
            } else if !hidden {
                visit(rel, false);
            }
        }
    }

    pub fn resolve_link_path(&self, link: &str, from: &str) -> Option<FileRef> {
        resolve_in(&self.files(), link, from)
    }

    /// Moves `file` to `new_path` and points wiki links at its new home.
    pub fn rename(&self, file: &FileRef, new_path: &str) -> Result<FileRef, VaultError> {
        let new_path = checked_path(new_path)?;
        if new_path == file.path {
            return Ok(file.clone());
        }
        if !self.abs(&file.path).is_file() {
            return Err(VaultError::NotFound(file.path.clone()));
        }
        let case_only = new_path.to_lowercase() == file.path.to_lowercase();
        if self.exists(&new_path) && !case_only {
            return Err(VaultError::AlreadyExists(new_path));
        }
        let parent = path::parent(&new_path);
        if !self.abs(parent).is_dir() {
            return Err(VaultError::NotFound(parent.to_string()));
        }

        let moved = FileRef::new(new_path.clone());
        let files = self.files();
        let target = link_text_for(&files, file, &moved);
        let rewrites = self.backlink_rewrites(&files, file, &target);

        fs::rename(self.abs(&file.path), self.abs(&moved.path))
            .map_err(|e| VaultError::io(&file.path, e))?;
        info!(from = %file.path, to = %moved.path, "moved file");

        for (note, content) in rewrites {
            let note = if note == file.path { moved.path.clone() } else { note };
            match self.write(&note, &content) {
                Ok(()) => debug!(note = %note, "rewrote links"),
                Err(e) => warn!(note = %note, error = %e, "could not rewrite links"),
            }
        }
        Ok(moved)
    }

    /// New contents of every note holding a wiki link that resolves to `file`.
    fn backlink_rewrites(&self, files: &[String], file: &FileRef, target: &str) -> Vec<(String, String)> {
        files
            .iter()
            .filter(|f| is_note(f))
            .filter_map(|note| {
                let content = self.read(note).ok()?;
                let edits = links::wikilink_edits(&content, target, |link| {
                    resolve_in(files, link, note).is_some_and(|found| found.path == file.path)
                });
                let rewritten = links::apply_edits(&content, &edits);
                (rewritten != content).then(|| (note.clone(), rewritten))
            })
            .collect()
    }
}

fn is_note(path: &str) -> bool {
    FileRef::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION))
}

fn checked_path(raw: &str) -> Result<String, VaultError> {
    let normalized = normalize_path(raw);
    if normalized == ROOT || climbs_up(&normalized) {
        return Err(VaultError::OutsideVault(raw.to_string()));
    }
    Ok(normalized)
}

/// Link text that reaches `moved`: its bare name when no other file shares it,
/// the full path otherwise. Notes drop their extension.
fn link_text_for(files: &[String], old: &FileRef, moved: &FileRef) -> String {
    let note = is_note(&moved.path);
    let name = if note { moved.basename() } else { moved.name.as_str() };
    let clashes = files
        .iter()
        .filter(|f| **f != old.path)
        .map(|f| FileRef::new(f.as_str()))
        .any(|f| {
            let other = if is_note(&f.path) { f.basename() } else { f.name.as_str() };
            other.eq_ignore_ascii_case(name)
        });
    if !clashes {
        return name.to_string();
    }
    match moved.path.rfind('.') {
        Some(dot) if note => moved.path[..dot].to_string(),
        _ => moved.path.clone(),
    }
}

/// First file `link` reaches from the note at `from`, looking in order at the
/// note itself (empty link), the note's folder, the vault root, and finally
/// any file whose path ends with the link (shortest path wins).
fn resolve_in(files: &[String], link: &str, from: &str) -> Option<FileRef> {
    let link = link.trim();
    let has = |path: &str| files.binary_search_by(|f| f.as_str().cmp(path)).is_ok();

    if link.is_empty() {
        return has(from).then(|| FileRef::new(from));
    }

    let mut candidates = vec![link.to_string()];
    if !is_note(link) {
        candidates.push(format!("{}.{}", link, NOTE_EXTENSION));
    }

    let absolute = link.starts_with('/');
    for candidate in &candidates {
        if !absolute {
            if let Some(rel) = resolve_relative(path::parent(from), candidate) {
                if has(&rel) {
                    return Some(FileRef::new(rel));
                }
            }
        }
        if let Some(rooted) = resolve_relative(ROOT, candidate) {
            if has(&rooted) {
                return Some(FileRef::new(rooted));
            }
        }
    }
    if absolute {
        return None;
    }

    for candidate in &candidates {
        let wanted = normalize_path(candidate).to_lowercase();
        let suffix = format!("/{}", wanted);
        let best = files
            .iter()
            .filter(|f| {
                let lower = f.to_lowercase();
                lower == wanted || lower.ends_with(&suffix)
            })
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        if let Some(found) = best {
            return Some(FileRef::new(found.as_str()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault_with(files: &[(&str, &str)]) -> (TempDir, Vault) {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let abs = dir.path().join(rel);
            fs::create_dir_all(abs.parent().unwrap()).unwrap();
            fs::write(abs, content).unwrap();
        }
        let vault = Vault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn lists_visible_files_and_folders() {
        let (_dir, vault) = vault_with(&[
            ("b.md", ""),
            ("a/x.md", ""),
            ("a/deep/y.md", ""),
            (".obsidian/app.json", ""),
            (".hidden.md", ""),
            ("c/.keep", ""),
        ]);
        assert_eq!(vault.files(), vec!["a/deep/y.md", "a/x.md", "b.md"]);
        let folders: Vec<String> = vault.folders().into_iter().map(|f| f.path).collect();
        assert_eq!(folders, vec!["/", "a", "a/deep", "c"]);

        let shown = vault.clone().with_hidden_folders(true);
        assert!(shown.folders().iter().any(|f| f.path == ".obsidian"));
    }

    #[test]
    fn resolution_prefers_relative_then_root_then_basename() {
        let (_dir, vault) = vault_with(&[
            ("Note.md", ""),
            ("projects/Note.md", ""),
            ("projects/Plan.md", ""),
            ("archive/old/Plan.md", ""),
            ("archive/Unique.md", ""),
        ]);
        let from = "projects/Plan.md";
        assert_eq!(vault.resolve_link_path("Note", from).unwrap().path, "projects/Note.md");
        assert_eq!(vault.resolve_link_path("Note", "b.md").unwrap().path, "Note.md");
        assert_eq!(vault.resolve_link_path("Unique", from).unwrap().path, "archive/Unique.md");
        assert_eq!(vault.resolve_link_path("old/plan", "Note.md").unwrap().path, "archive/old/Plan.md");
        assert_eq!(vault.resolve_link_path("../Note.md", from).unwrap().path, "Note.md");
        assert_eq!(vault.resolve_link_path("", from).unwrap().path, from);
        assert!(vault.resolve_link_path("Missing", from).is_none());
    }

    #[test]
    fn mkdir_stays_inside_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("vault");
        fs::create_dir_all(&root).unwrap();
        let vault = Vault::open(&root).unwrap();
        assert!(matches!(vault.mkdir("../sibling"), Err(VaultError::OutsideVault(_))));
        assert!(!outer.path().join("sibling").exists());
        vault.mkdir("inside/deeper").unwrap();
        assert!(root.join("inside/deeper").is_dir());
    }

    #[test]
    fn basename_match_picks_shortest_path() {
        let (_dir, vault) = vault_with(&[("z/Topic.md", ""), ("a/b/Topic.md", ""), ("y/Topic.md", "")]);
        assert_eq!(vault.resolve_link_path("Topic", "n.md").unwrap().path, "y/Topic.md");
    }

    #[test]
    fn rename_rewrites_backlinks() {
        let (_dir, vault) = vault_with(&[
            ("Old.md", "self [[Old#Top]]"),
            ("index.md", "[[Old]] [[Old#h]] [[Old|a]] [[Other]]\n"),
            ("Other.md", ""),
            ("dest/.keep", ""),
        ]);
        let moved = vault.rename(&FileRef::new("Old.md"), "dest/New.md").unwrap();
        assert_eq!(moved.path, "dest/New.md");
        assert!(!vault.exists("Old.md"));
        assert_eq!(vault.read("index.md").unwrap(), "[[New]] [[New#h]] [[New|a]] [[Other]]\n");
        assert_eq!(vault.read("dest/New.md").unwrap(), "self [[New#Top]]");
    }

    #[test]
    fn rename_uses_full_path_when_name_is_shared() {
        let (_dir, vault) = vault_with(&[
            ("Draft.md", ""),
            ("index.md", "[[Draft]]"),
            ("other/Final.md", ""),
        ]);
        vault.rename(&FileRef::new("Draft.md"), "Final.md").unwrap();
        assert_eq!(vault.read("index.md").unwrap(), "[[Final]]");

        let (_dir, vault) = vault_with(&[
            ("Draft.md", ""),
            ("index.md", "[[Draft]]"),
            ("other/Final.md", ""),
            ("sub/.keep", ""),
        ]);
        vault.rename(&FileRef::new("Draft.md"), "sub/Final.md").unwrap();
        assert_eq!(vault.read("index.md").unwrap(), "[[sub/Final]]");
    }

    #[test]
    fn rename_refuses_bad_destinations() {
        let (_dir, vault) = vault_with(&[("a.md", "A"), ("b.md", "B")]);
        let a = FileRef::new("a.md");
        assert!(matches!(vault.rename(&a, "b.md"), Err(VaultError::AlreadyExists(_))));
        assert!(matches!(vault.rename(&a, "missing/a.md"), Err(VaultError::NotFound(_))));
        assert!(matches!(vault.rename(&a, "../a.md"), Err(VaultError::OutsideVault(_))));
        assert!(matches!(
            vault.rename(&FileRef::new("gone.md"), "c.md"),
            Err(VaultError::NotFound(_))
        ));
        assert_eq!(vault.read("b.md").unwrap(), "B");
    }

    #[test]
    fn mkdir_is_idempotent() {
        let (_dir, vault) = vault_with(&[]);
        vault.mkdir("x/y").unwrap();
        vault.mkdir("x/y").unwrap();
        assert!(vault.abs("x/y").is_dir());
    }
}
