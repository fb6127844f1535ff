//! Names skipped when walking a library directory.

use std::ffi::OsStr;
use std::path::Path;

/// Version-control metadata directories that never contribute to a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsDir {
    /// Subversion working copy metadata
    Svn,
    /// Git database
    Git,
    /// Bazaar branch metadata
    Bzr,
    /// Mercurial repository
    Hg,
}

impl VcsDir {
    /// Every known VCS directory.
    pub const ALL: [VcsDir; 4] = [Self::Svn, Self::Git, Self::Bzr, Self::Hg];

    /// Get the directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Svn => ".svn",
            Self::Git => ".git",
            Self::Bzr => ".bzr",
            Self::Hg => ".hg",
        }
    }

    /// Check whether a directory name is VCS metadata.
    pub fn matches(name: &OsStr) -> bool {
        Self::ALL.iter().any(|dir| name == dir.as_str())
    }
}

/// File extensions of editor swap files and build droppings.
pub const IGNORED_EXTENSIONS: [&str; 4] = [".swp", ".tmp", ".pyc", ".pyo"];

/// Check whether a file should be skipped because of its extension.
///
/// A dotfile such as `.swp` has no extension and is kept.
pub fn has_ignored_extension(path: &Path) -> bool {
    match path.extension().and_then(OsStr::to_str) {
        Some(ext) => IGNORED_EXTENSIONS
            .iter()
            .any(|ignored| ignored.strip_prefix('.') == Some(ext)),
        None => false,
    }
}
