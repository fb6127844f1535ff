//! [`LibraryTree`] builder for on-disk library directories.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding the files of one asset library.
///
/// # Example
///
/// ```rust,no_run
/// use asset_test_utils::tree::LibraryTree;
///
/// let tree = LibraryTree::sample();
/// tree.write("js/extra.js", "var extra;");
/// tree.assert_file_exists("js/extra.js");
/// ```
pub struct LibraryTree {
    temp_dir: TempDir,
}

impl Default for LibraryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryTree {
    /// Create an empty library directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a library directory with a small, realistic set of assets:
    ///
    /// - `style.css`
    /// - `js/jquery.js`
    /// - `js/app.js`
    /// - `img/favicon.ico`
    pub fn sample() -> Self {
        let tree = Self::new();
        tree.write("style.css", "body { margin: 0; }\n");
        tree.write("js/jquery.js", "/* jquery */\n");
        tree.write("js/app.js", "/* app */\n");
        tree.write("img/favicon.ico", "ICO");
        tree
    }

    /// Return the root path of the library.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relpath` inside the library.
    pub fn path(&self, relpath: &str) -> PathBuf {
        self.root().join(relpath)
    }

    /// Write `content` to `relpath`, creating parent directories.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn write(&self, relpath: &str, content: &str) {
        let full_path = self.path(relpath);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("LibraryTree::write: failed to create {}: {e}", parent.display()));
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("LibraryTree::write: failed to write {}: {e}", full_path.display()));
    }

    /// Create an empty directory at `relpath`.
    pub fn mkdir(&self, relpath: &str) {
        fs::create_dir_all(self.path(relpath)).unwrap();
    }

    /// Remove the file at `relpath`.
    pub fn remove(&self, relpath: &str) {
        fs::remove_file(self.path(relpath)).unwrap();
    }

    /// Rename `from` to `to`, both relative to the root.
    pub fn rename(&self, from: &str, to: &str) {
        fs::rename(self.path(from), self.path(to)).unwrap();
    }

    /// Create a fake VCS metadata directory with one file in it.
    pub fn fake_vcs_dir(&self, name: &str) {
        self.write(&format!("{name}/entries"), "metadata");
    }

    /// Assert that `relpath` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relpath: &str) {
        let full_path = self.path(relpath);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
