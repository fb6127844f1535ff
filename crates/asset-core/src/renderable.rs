//! Things that end up in a page
//!
//! A [`Renderable`] is the output unit of resolution: a plain resource, a slot
//! filled with a concrete resource for one request, or a bundle of adjacent
//! resources served from a single URL. Renderables only hold handles, so every
//! accessor takes the [`Registry`] that issued them.
//!
//! Accessors panic when a handle does not belong to the registry, the same
//! way indexing the registry does. The public pipeline functions run
//! [`Renderable::check`] on their input first.

use crate::bundle::BUNDLE_PREFIX;
use crate::graph::{AssetId, LibraryId, Node, Resource, Slot};
use crate::registry::Registry;
use crate::renderer::Renderer;
use crate::{Error, Result};

/// A slot bound to the resource that fills it.
///
/// Renders as the filler but ranks like the slot, so it sorts where the
/// slot was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilledSlot {
    pub(crate) slot: AssetId,
    pub(crate) filler: AssetId,
}

impl FilledSlot {
    /// Bind `filler` to `slot`. Not validated until the binding goes through
    /// a pipeline function or [`Renderable::check`].
    pub fn new(slot: AssetId, filler: AssetId) -> Self {
        Self { slot, filler }
    }

    pub fn slot(&self) -> AssetId {
        self.slot
    }

    pub fn filler(&self) -> AssetId {
        self.filler
    }
}

/// Adjacent compatible resources served together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bundle {
    pub(crate) members: Vec<Renderable>,
}

impl Bundle {
    /// Bundled renderables in page order; never bundles themselves.
    pub fn members(&self) -> &[Renderable] {
        &self.members
    }
}

/// A resolved, renderable item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Renderable {
    Resource(AssetId),
    FilledSlot(FilledSlot),
    Bundle(Bundle),
}

impl From<AssetId> for Renderable {
    fn from(id: AssetId) -> Self {
        Self::Resource(id)
    }
}

impl From<FilledSlot> for Renderable {
    fn from(filled: FilledSlot) -> Self {
        Self::FilledSlot(filled)
    }
}

impl Renderable {
    /// The resource this renderable takes its file and flags from: the
    /// resource itself, a slot's filler or a bundle's first member.
    pub fn identity<'r>(&self, registry: &'r Registry) -> &'r Resource {
        match self {
            Renderable::Resource(id) => resource_at(registry, *id),
            Renderable::FilledSlot(filled) => resource_at(registry, filled.filler),
            Renderable::Bundle(bundle) => bundle.members[0].identity(registry),
        }
    }

    /// Library the file is served from.
    pub fn library(&self, registry: &Registry) -> LibraryId {
        self.identity(registry).library()
    }

    /// Library whose rank places this renderable in a page. A filled slot is
    /// placed by the slot's library, whatever library its filler comes from.
    pub fn sort_library(&self, registry: &Registry) -> LibraryId {
        match self {
            Renderable::FilledSlot(filled) => registry
                .slot(filled.slot)
                .map_or_else(|| self.library(registry), Slot::library),
            Renderable::Bundle(bundle) => bundle.members[0].sort_library(registry),
            Renderable::Resource(_) => self.library(registry),
        }
    }

    /// Path relative to the library root; a bundle's path names every member.
    pub fn relpath(&self, registry: &Registry) -> String {
        match self {
            Renderable::Bundle(bundle) => {
                let filenames: Vec<&str> = bundle
                    .members
                    .iter()
                    .map(|member| member.identity(registry).filename())
                    .collect();
                format!(
                    "{}{}{}",
                    self.dirname(registry),
                    BUNDLE_PREFIX,
                    filenames.join(";")
                )
            }
            _ => self.identity(registry).relpath().to_string(),
        }
    }

    pub fn dirname<'r>(&self, registry: &'r Registry) -> &'r str {
        self.identity(registry).dirname()
    }

    pub fn ext<'r>(&self, registry: &'r Registry) -> &'r str {
        self.identity(registry).ext()
    }

    pub fn order(&self, registry: &Registry) -> usize {
        self.identity(registry).order()
    }

    pub fn renderer<'r>(&self, registry: &'r Registry) -> &'r Renderer {
        self.identity(registry).renderer()
    }

    pub fn bottom(&self, registry: &Registry) -> bool {
        self.identity(registry).bottom()
    }

    pub fn dont_bundle(&self, registry: &Registry) -> bool {
        self.identity(registry).dont_bundle()
    }

    /// Rollups of the underlying resource. Bundles are never rolled up.
    pub fn rollups<'r>(&self, registry: &'r Registry) -> &'r [AssetId] {
        match self {
            Renderable::Bundle(_) => &[],
            _ => self.identity(registry).rollups(),
        }
    }

    /// Depth within the library; a filled slot ranks like its slot.
    pub fn dependency_nr(&self, registry: &Registry) -> u32 {
        let ranks = registry.prepare();
        match self {
            Renderable::Resource(id) => ranks.dependency_nr(*id),
            Renderable::FilledSlot(filled) => ranks.dependency_nr(filled.slot),
            Renderable::Bundle(bundle) => bundle.members[0].dependency_nr(registry),
        }
    }

    /// The rendition for `mode`, falling back to `self`.
    pub fn mode(&self, registry: &Registry, mode: &str) -> Renderable {
        match self {
            Renderable::Resource(id) => Renderable::Resource(registry.mode(*id, mode)),
            Renderable::FilledSlot(filled) => Renderable::FilledSlot(FilledSlot {
                slot: filled.slot,
                filler: registry.mode(filled.filler, mode),
            }),
            Renderable::Bundle(_) => self.clone(),
        }
    }

    /// Render the inclusion snippet given the URL of the library.
    pub fn render(&self, registry: &Registry, library_url: &str) -> String {
        let url = format!("{library_url}/{}", self.relpath(registry));
        self.renderer(registry).render(&url)
    }
}

impl Renderable {
    /// Check that every handle in `self` refers to the right kind of node of
    /// `registry`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for a resource handle that is not a
    /// resource or a malformed bundle, and `Error::Slot` for a filled slot
    /// whose filler cannot fill it.
    pub fn check(&self, registry: &Registry) -> Result<()> {
        match self {
            Renderable::Resource(id) => match registry.resource(*id) {
                Some(_) => Ok(()),
                None => Err(Error::configuration(format!(
                    "{} is not a resource",
                    registry.describe(*id)
                ))),
            },
            Renderable::FilledSlot(filled) => registry.check_slot_fill(filled.slot, filled.filler),
            Renderable::Bundle(bundle) => {
                if bundle.members.is_empty() {
                    return Err(Error::configuration("Bundle without members"));
                }
                for member in &bundle.members {
                    if matches!(member, Renderable::Bundle(_)) {
                        return Err(Error::configuration("Bundles cannot be nested"));
                    }
                    member.check(registry)?;
                }
                Ok(())
            }
        }
    }
}

/// Collect `resources`, checking each against `registry`.
pub(crate) fn checked(
    registry: &Registry,
    resources: impl IntoIterator<Item = Renderable>,
) -> Result<Vec<Renderable>> {
    resources
        .into_iter()
        .map(|resource| resource.check(registry).map(|()| resource))
        .collect()
}

fn resource_at(registry: &Registry, id: AssetId) -> &Resource {
    match &registry[id] {
        Node::Resource(resource) => resource,
        _ => panic!("{} is not a resource", registry.describe(id)),
    }
}
