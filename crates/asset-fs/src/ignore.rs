//! Glob-based ignore rules for published library paths.

use glob_match::glob_match;

/// Check whether any `/`-separated segment of `request_path` matches one of
/// the `ignores` globs.
///
/// Globs are matched per segment, so `*.psd` hides `art/logo.psd` and `.svn`
/// hides everything under an `.svn` directory.
pub fn is_ignored<S: AsRef<str>>(request_path: &str, ignores: &[S]) -> bool {
    request_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .any(|segment| {
            ignores
                .iter()
                .any(|pattern| glob_match(pattern.as_ref(), segment))
        })
}
