//! Library directory signatures
//!
//! A signature is a short string that changes whenever the published contents
//! of a library directory change. It is used as a cache-busting URL segment.
//! Two strategies are provided:
//!
//! - [`MtimeSignature`]: the latest modification time found in the tree. Cheap,
//!   but it never returns to an earlier value once something was touched.
//! - [`ContentHashSignature`]: a SHA-256 digest over relative paths and file
//!   contents. Adding and then removing a file restores the original value.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::walk::{list_directory, relative_key};
use crate::{Error, Result};

/// A way of computing the signature of a directory tree.
pub trait SignatureMethod: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Compute the signature of the tree rooted at `root`.
    fn compute(&self, root: &Path) -> Result<String>;
}

/// Signature from the most recent modification time in the tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct MtimeSignature;

/// Signature from a SHA-256 digest of paths and contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHashSignature;

static MTIME: MtimeSignature = MtimeSignature;
static CONTENT_HASH: ContentHashSignature = ContentHashSignature;

/// Selects one of the built-in signature methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureKind {
    #[default]
    Mtime,
    ContentHash,
}

impl SignatureKind {
    /// The shared instance of the selected method.
    pub fn method(self) -> &'static dyn SignatureMethod {
        match self {
            Self::Mtime => &MTIME,
            Self::ContentHash => &CONTENT_HASH,
        }
    }
}

impl SignatureMethod for MtimeSignature {
    fn name(&self) -> &'static str {
        "mtime"
    }

    fn compute(&self, root: &Path) -> Result<String> {
        let mut latest = UNIX_EPOCH;
        for path in list_directory(root, true)? {
            let modified = std::fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .map_err(|e| Error::io(&path, e))?;
            latest = latest.max(modified);
        }
        let signature = format_mtime(latest);
        tracing::debug!(root = %root.display(), %signature, "Computed mtime signature");
        Ok(signature)
    }
}

impl SignatureMethod for ContentHashSignature {
    fn name(&self) -> &'static str {
        "content-hash"
    }

    fn compute(&self, root: &Path) -> Result<String> {
        if !root.is_dir() {
            return Err(Error::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        let mut hasher = Sha256::new();
        for path in list_directory(root, true)? {
            hasher.update(relative_key(root, &path).as_bytes());
            hasher.update([0u8]);
            if path.is_file() {
                let content = std::fs::read(&path).map_err(|e| Error::io(&path, e))?;
                hasher.update(&content);
                hasher.update([0u8]);
            }
        }
        let signature = format!("{:x}", hasher.finalize());
        tracing::debug!(root = %root.display(), %signature, "Computed content hash signature");
        Ok(signature)
    }
}

/// Seconds since the epoch with microsecond precision.
fn format_mtime(time: SystemTime) -> String {
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!(
        "{}.{:06}",
        since_epoch.as_secs(),
        since_epoch.subsec_micros()
    )
}
