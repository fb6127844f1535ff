//! Per-request needed sets
//!
//! A [`NeededResources`] collects the assets one unit of work asks for,
//! together with slot bindings, and resolves them into concrete
//! [`Renderable`]s. It also builds library URLs for rendering.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::config::NeededConfig;
use crate::graph::{AssetId, Dependable, LibraryId, Node};
use crate::library::VERSION_PREFIX;
use crate::registry::Registry;
use crate::renderable::{FilledSlot, Renderable};
use crate::{Error, Result};

/// Assets needed by one unit of work.
#[derive(Debug)]
pub struct NeededResources {
    registry: Arc<Registry>,
    config: NeededConfig,
    base_url: Option<String>,
    needed: BTreeSet<AssetId>,
    slots: BTreeMap<AssetId, AssetId>,
    url_cache: RefCell<HashMap<LibraryId, String>>,
}

impl NeededResources {
    /// Create an empty needed set. Prepares the registry if needed.
    pub fn new(registry: Arc<Registry>, config: NeededConfig) -> Self {
        registry.prepare();
        Self {
            base_url: config.base_url.clone(),
            registry,
            config,
            needed: BTreeSet::new(),
            slots: BTreeMap::new(),
            url_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &NeededConfig {
        &self.config
    }

    /// Need `asset` and everything it depends on.
    pub fn need(&mut self, asset: AssetId) -> Result<()> {
        self.need_with_slots(asset, std::iter::empty())
    }

    /// Need `asset`, filling slots with the given `(slot, filler)` bindings.
    ///
    /// Bindings are validated before anything is recorded. A later binding
    /// for the same slot replaces an earlier one.
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` when `asset` is not in the registry
    /// - `Error::Slot` when a binding does not fit its slot
    pub fn need_with_slots(
        &mut self,
        asset: AssetId,
        slots: impl IntoIterator<Item = (AssetId, AssetId)>,
    ) -> Result<()> {
        if self.registry.get(asset).is_none() {
            return Err(Error::configuration(format!("Unknown asset handle {asset}")));
        }
        let slots: Vec<(AssetId, AssetId)> = slots.into_iter().collect();
        for &(slot, filler) in &slots {
            self.registry.check_slot_fill(slot, filler)?;
        }
        self.needed.insert(asset);
        self.slots.extend(slots);
        Ok(())
    }

    /// Whether anything was needed.
    pub fn has_resources(&self) -> bool {
        !self.needed.is_empty()
    }

    /// Directly needed assets, without their dependencies.
    pub fn needed(&self) -> &BTreeSet<AssetId> {
        &self.needed
    }

    /// Forget needed assets. Slot bindings and the base URL stay.
    pub fn clear(&mut self) {
        self.needed.clear();
    }

    pub fn has_base_url(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Set the base URL unless one was configured or set before.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        if self.base_url.is_none() {
            self.base_url = Some(url.into());
            self.url_cache.borrow_mut().clear();
        }
    }

    /// Every concrete asset needed, with slots replaced by their fillers.
    ///
    /// # Errors
    ///
    /// Returns `Error::Slot` when a required slot has no binding and no
    /// default, or a binding no longer fits.
    pub fn resolve(&self) -> Result<Vec<Renderable>> {
        let closure: BTreeSet<AssetId> = self
            .needed
            .iter()
            .flat_map(|&asset| self.registry[asset].resources().iter().copied())
            .collect();
        self.fill_slots(closure)
    }

    fn fill_slots(&self, closure: BTreeSet<AssetId>) -> Result<Vec<Renderable>> {
        let mut resolved = BTreeSet::new();
        for id in closure {
            let slot = match &self.registry[id] {
                Node::Slot(slot) => slot,
                Node::Resource(_) => {
                    resolved.insert(Renderable::Resource(id));
                    continue;
                }
                Node::Group(_) => continue,
            };

            let filler = match self.slots.get(&id).copied().or(slot.default) {
                Some(filler) => filler,
                None if !slot.required => continue,
                None => {
                    return Err(Error::slot(format!(
                        "slot {} was required but not filled in",
                        self.registry.describe(id)
                    )));
                }
            };
            self.registry.check_slot_fill(id, filler)?;
            tracing::debug!(
                slot = %self.registry.describe(id),
                filler = %self.registry.describe(filler),
                "Filled slot"
            );
            resolved.insert(Renderable::FilledSlot(FilledSlot { slot: id, filler }));
        }
        Ok(resolved.into_iter().collect())
    }

    /// URL of `library`:
    /// `{base_url or script_name}/{publisher_signature}/{name}[/:version:{signature}]`.
    ///
    /// Memoized for the lifetime of this needed set.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fs` when versioning is on and the library signature
    /// cannot be computed.
    pub fn library_url(&self, library: LibraryId) -> Result<String> {
        if let Some(url) = self.url_cache.borrow().get(&library) {
            return Ok(url.clone());
        }

        let lib = &self.registry[library];
        let mut segments = vec![
            self.base_url
                .as_deref()
                .or(self.config.script_name.as_deref())
                .unwrap_or("")
                .to_string(),
        ];
        if !self.config.publisher_signature.is_empty() {
            segments.push(self.config.publisher_signature.clone());
        }
        segments.push(lib.name().to_string());
        if self.config.versioning {
            let signature = lib.signature(
                self.config.recompute_hashes,
                self.config.signature_kind().method(),
            )?;
            segments.push(format!("{VERSION_PREFIX}{signature}"));
        }

        let url = segments.join("/");
        self.url_cache.borrow_mut().insert(library, url.clone());
        Ok(url)
    }
}
