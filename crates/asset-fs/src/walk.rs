//! Directory listing for library roots.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::{VcsDir, has_ignored_extension};
use crate::{Error, Result};

/// List every entry below `root` that contributes to a library signature.
///
/// VCS metadata directories are pruned with everything under them and files
/// with an ignored extension are skipped. Dotfiles are kept. The root itself
/// is listed when `include_directories` is set. Entries come back sorted by
/// file name at each level, so the listing is stable between runs.
///
/// # Errors
///
/// Returns `Error::Io` if a directory cannot be read.
pub fn list_directory(root: &Path, include_directories: bool) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() > 0 && entry.file_type().is_dir() && VcsDir::matches(entry.file_name()))
        });

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            Error::io(path, source)
        })?;

        if entry.file_type().is_dir() {
            if include_directories {
                found.push(entry.into_path());
            }
            continue;
        }
        if has_ignored_extension(entry.path()) {
            continue;
        }
        found.push(entry.into_path());
    }
    Ok(found)
}

/// Express `path` relative to `root` with `/` separators.
pub(crate) fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_key_uses_forward_slashes() {
        let root = Path::new("/lib/root");
        let path = root.join("a").join("b.js");
        assert_eq!(relative_key(root, &path), "a/b.js");
        assert_eq!(relative_key(root, root), "");
    }
}
