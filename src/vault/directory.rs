use tracing::{debug, info};

use super::path::{climbs_up, join, normalize_path, sub_paths, ROOT};
use super::VaultError;
use crate::host::{DirectoryAdapter, MkdirMode};

/// Makes sure the vault folder `dir` exists, creating missing levels.
///
/// Some mobile storage backends cannot create nested folders in one call, so
/// [`MkdirMode::Sequential`] walks the path and creates each missing level
/// shallowest first. A folder that appears between the check and the create
/// is not an error. Paths with `..` segments are refused before anything is
/// touched.
pub fn ensure_directory<A>(adapter: &mut A, dir: &str) -> Result<(), VaultError>
where
    A: DirectoryAdapter + ?Sized,
{
    let target = normalize_path(&join(&[ROOT, dir]));
    if climbs_up(&target) {
        return Err(VaultError::OutsideVault(dir.to_string()));
    }
    if target == ROOT || adapter.exists(&target) {
        debug!(dir = %target, "directory already present");
        return Ok(());
    }

    match adapter.mkdir_mode() {
        MkdirMode::Recursive => create(adapter, &target)?,
        MkdirMode::Sequential => {
            for level in sub_paths(&target) {
                if !adapter.exists(&level) {
                    create(adapter, &level)?;
                }
            }
        }
    }
    info!(dir = %target, "created directory");
    Ok(())
}

fn create<A>(adapter: &mut A, path: &str) -> Result<(), VaultError>
where
    A: DirectoryAdapter + ?Sized,
{
    match adapter.mkdir(path) {
        Err(VaultError::AlreadyExists(_)) => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeAdapter {
        dirs: HashSet<String>,
        mode: MkdirMode,
        calls: Vec<String>,
        /// Paths that "someone else" creates right before our mkdir lands.
        racing: HashSet<String>,
    }

    impl FakeAdapter {
        fn new(mode: MkdirMode, existing: &[&str]) -> Self {
            Self {
                dirs: existing.iter().map(|d| d.to_string()).collect(),
                mode,
                calls: Vec::new(),
                racing: HashSet::new(),
            }
        }
    }

    impl DirectoryAdapter for FakeAdapter {
        fn exists(&self, path: &str) -> bool {
            self.dirs.contains(path)
        }

        fn mkdir(&mut self, path: &str) -> Result<(), VaultError> {
            self.calls.push(path.to_string());
            if self.racing.contains(path) || !self.dirs.insert(path.to_string()) {
                return Err(VaultError::AlreadyExists(path.to_string()));
            }
            Ok(())
        }

        fn mkdir_mode(&self) -> MkdirMode {
            self.mode
        }
    }

    #[test]
    fn existing_directory_is_left_alone() {
        let mut adapter = FakeAdapter::new(MkdirMode::Recursive, &["a/b"]);
        ensure_directory(&mut adapter, "/a/b/").unwrap();
        assert!(adapter.calls.is_empty());
    }

    #[test]
    fn recursive_mode_makes_one_call() {
        let mut adapter = FakeAdapter::new(MkdirMode::Recursive, &[]);
        ensure_directory(&mut adapter, "a\\b//c").unwrap();
        assert_eq!(adapter.calls, vec!["a/b/c"]);
    }

    #[test]
    fn sequential_mode_creates_each_missing_level() {
        let mut adapter = FakeAdapter::new(MkdirMode::Sequential, &["a"]);
        ensure_directory(&mut adapter, "a/b/c").unwrap();
        assert_eq!(adapter.calls, vec!["a/b", "a/b/c"]);
    }

    #[test]
    fn root_needs_nothing() {
        let mut adapter = FakeAdapter::new(MkdirMode::Sequential, &[]);
        ensure_directory(&mut adapter, "/").unwrap();
        ensure_directory(&mut adapter, "").unwrap();
        assert!(adapter.calls.is_empty());
    }

    #[test]
    fn parent_segments_are_refused_untouched() {
        for mode in [MkdirMode::Recursive, MkdirMode::Sequential] {
            let mut adapter = FakeAdapter::new(mode, &[]);
            assert!(matches!(
                ensure_directory(&mut adapter, "../escaped"),
                Err(VaultError::OutsideVault(_))
            ));
            assert!(matches!(
                ensure_directory(&mut adapter, "a/../b"),
                Err(VaultError::OutsideVault(_))
            ));
            assert!(adapter.calls.is_empty());
        }
    }

    #[test]
    fn concurrent_creation_counts_as_success() {
        let mut adapter = FakeAdapter::new(MkdirMode::Recursive, &[]);
        adapter.racing.insert("late".to_string());
        ensure_directory(&mut adapter, "late").unwrap();
        assert_eq!(adapter.calls, vec!["late"]);
    }
}
