//! Resource libraries
//!
//! A library is a named directory of static files. Every resource, slot and
//! mode rendition is declared in exactly one library.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use asset_fs::SignatureMethod;

use crate::Result;
use crate::graph::{AssetId, LibraryId};

/// Prefix of the URL segment that carries a library signature.
pub const VERSION_PREFIX: &str = ":version:";

/// A named root directory of static asset files.
#[derive(Debug)]
pub struct Library {
    name: String,
    path: PathBuf,
    ignores: Vec<String>,
    version: Option<String>,
    signature: Mutex<Option<String>>,
    pub(crate) known_resources: HashMap<String, AssetId>,
    pub(crate) known_assets: Vec<AssetId>,
    /// Libraries the assets of this library depend on (may include itself).
    pub(crate) library_deps: BTreeSet<LibraryId>,
}

impl Library {
    /// Create a library called `name` publishing the directory at `path`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ignores: Vec::new(),
            version: None,
            signature: Mutex::new(None),
            known_resources: HashMap::new(),
            known_assets: Vec::new(),
            library_deps: BTreeSet::new(),
        }
    }

    /// Globs of files and directories that must not be published.
    pub fn with_ignores<I, S>(mut self, ignores: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignores = ignores.into_iter().map(Into::into).collect();
        self
    }

    /// Pin the signature to an explicit version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ignores(&self) -> &[String] {
        &self.ignores
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Check whether `request_path` hits one of the ignore globs.
    pub fn is_ignored(&self, request_path: &str) -> bool {
        asset_fs::is_ignored(request_path, &self.ignores)
    }

    /// Look up a resource declared in this library by its relative path.
    pub fn known_resource(&self, relpath: &str) -> Option<AssetId> {
        self.known_resources.get(relpath).copied()
    }

    /// All assets (resources and slots) declared in this library, in
    /// declaration order.
    pub fn known_assets(&self) -> &[AssetId] {
        &self.known_assets
    }

    /// Libraries this library depends on, itself included once it has any
    /// asset with a dependency.
    pub fn library_deps(&self) -> &BTreeSet<LibraryId> {
        &self.library_deps
    }

    /// Get the signature of this library.
    ///
    /// An explicit version is returned verbatim and never recomputed.
    /// Otherwise `method` is applied to the library directory. The result is
    /// cached unless `force_recompute` is set, in which case the tree is
    /// scanned on every call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fs` if the directory cannot be scanned.
    pub fn signature(&self, force_recompute: bool, method: &dyn SignatureMethod) -> Result<String> {
        if let Some(version) = &self.version {
            return Ok(version.clone());
        }

        let mut cached = self
            .signature
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !force_recompute {
            if let Some(signature) = cached.as_ref() {
                return Ok(signature.clone());
            }
        }

        let signature = method.compute(&self.path)?;
        tracing::debug!(
            library = %self.name,
            method = method.name(),
            %signature,
            "Computed library signature"
        );
        if !force_recompute {
            *cached = Some(signature.clone());
        }
        Ok(signature)
    }
}
