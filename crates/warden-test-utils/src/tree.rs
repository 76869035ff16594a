//! [`TestTree`] builder for walker and CLI test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use warden_core::Policy;
use warden_fs::{ConfigStore, NormalizedPath};

/// A temporary directory tree with helpers for building walk scenarios.
///
/// # Example
///
/// ```rust,no_run
/// use warden_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.file("data/a.txt", "hello").dir("data/empty");
/// let policy = tree.policy(&["data"]);
/// assert_eq!(policy.include.len(), 1);
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` below the root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Normalized absolute path of `rel`, as a walk records it.
    pub fn npath(&self, rel: &str) -> NormalizedPath {
        NormalizedPath::new(self.path(rel))
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, rel: &str, content: impl AsRef<[u8]>) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self
    }

    /// Create a directory and its parents.
    pub fn dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.path(rel)).unwrap();
        self
    }

    /// Create a symlink at `rel` pointing at `target`.
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, rel: &str) -> &Self {
        std::os::unix::fs::symlink(target, self.path(rel)).unwrap();
        self
    }

    /// Remove a file or directory tree.
    pub fn remove(&self, rel: &str) -> &Self {
        let path = self.path(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).unwrap();
        } else {
            fs::remove_file(&path).unwrap();
        }
        self
    }

    /// A policy including each of `roots` (relative to the root).
    pub fn policy(&self, roots: &[&str]) -> Policy {
        Policy {
            include: roots.iter().map(|r| self.npath(r)).collect(),
            ..Policy::default()
        }
    }

    /// Persist `policy` under `name`; the extension picks the format.
    pub fn write_policy(&self, name: &str, policy: &Policy) -> PathBuf {
        let path = self.path(name);
        ConfigStore::new()
            .save(&NormalizedPath::new(&path), policy)
            .unwrap();
        path
    }

    /// Names of the entries directly inside `rel`, sorted.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path(rel))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }
}
