//! Asset graph nodes
//!
//! Nodes live in the arena owned by [`Registry`](crate::Registry) and refer
//! to each other through [`AssetId`] handles. Every node keeps three index
//! sets:
//!
//! - `depends`: direct dependencies
//! - `supports`: nodes that directly depend on this one
//! - `resources`: transitive closure of the concrete assets (resources and
//!   slots) reachable through `depends`, the node itself included when it is
//!   concrete
//!
//! The closure is maintained eagerly: adding an edge updates the closure of
//! every transitive supporter before the call returns.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::renderer::Renderer;

/// Name of the debug mode.
pub const DEBUG: &str = "debug";

/// Name of the minified mode.
pub const MINIFIED: &str = "minified";

/// Stable handle of a resource, slot or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(pub(crate) u32);

impl AssetId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable handle of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryId(pub(crate) u32);

impl LibraryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dependency edges and closure cache of one node.
#[derive(Debug, Clone, Default)]
pub struct Links {
    pub(crate) depends: BTreeSet<AssetId>,
    pub(crate) supports: BTreeSet<AssetId>,
    pub(crate) resources: BTreeSet<AssetId>,
}

/// Anything that takes part in the dependency graph.
pub trait Dependable {
    fn links(&self) -> &Links;

    /// Direct dependencies.
    fn depends(&self) -> &BTreeSet<AssetId> {
        &self.links().depends
    }

    /// Nodes that directly depend on this one.
    fn supports(&self) -> &BTreeSet<AssetId> {
        &self.links().supports
    }

    /// Every concrete asset needed when this node is needed.
    fn resources(&self) -> &BTreeSet<AssetId> {
        &self.links().resources
    }
}

/// One concrete asset file.
#[derive(Debug, Clone)]
pub struct Resource {
    pub(crate) library: LibraryId,
    pub(crate) relpath: String,
    pub(crate) dirname: String,
    pub(crate) filename: String,
    pub(crate) ext: String,
    pub(crate) order: usize,
    pub(crate) renderer: Renderer,
    pub(crate) bottom: bool,
    pub(crate) dont_bundle: bool,
    pub(crate) modes: BTreeMap<String, AssetId>,
    pub(crate) supersedes: Vec<AssetId>,
    pub(crate) rollups: Vec<AssetId>,
    pub(crate) links: Links,
}

impl Resource {
    pub fn library(&self) -> LibraryId {
        self.library
    }

    /// Path relative to the library root.
    pub fn relpath(&self) -> &str {
        &self.relpath
    }

    /// Directory part of the relative path, with a trailing `/` unless empty.
    pub fn dirname(&self) -> &str {
        &self.dirname
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Extension including the leading dot, empty when there is none.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Inclusion order of the renderer class.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Whether the resource may be included at the bottom of the page.
    pub fn bottom(&self) -> bool {
        self.bottom
    }

    pub fn dont_bundle(&self) -> bool {
        self.dont_bundle
    }

    /// Alternate renditions by mode name.
    pub fn modes(&self) -> &BTreeMap<String, AssetId> {
        &self.modes
    }

    /// The rendition for `mode`, if declared.
    pub fn mode(&self, mode: &str) -> Option<AssetId> {
        self.modes.get(mode).copied()
    }

    /// Resources this rollup replaces when all of them are needed.
    pub fn supersedes(&self) -> &[AssetId] {
        &self.supersedes
    }

    /// Rollups that supersede this resource.
    pub fn rollups(&self) -> &[AssetId] {
        &self.rollups
    }

    /// Render the inclusion snippet given the URL of the library.
    pub fn render(&self, library_url: &str) -> String {
        self.renderer.render(&format!("{library_url}/{}", self.relpath))
    }
}

impl Dependable for Resource {
    fn links(&self) -> &Links {
        &self.links
    }
}

/// A typed placeholder filled with a concrete resource per use.
#[derive(Debug, Clone)]
pub struct Slot {
    pub(crate) library: LibraryId,
    pub(crate) ext: String,
    pub(crate) required: bool,
    pub(crate) default: Option<AssetId>,
    pub(crate) links: Links,
}

impl Slot {
    pub fn library(&self) -> LibraryId {
        self.library
    }

    /// Extension every filler must have.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default_resource(&self) -> Option<AssetId> {
        self.default
    }
}

impl Dependable for Slot {
    fn links(&self) -> &Links {
        &self.links
    }
}

/// A dependency-only aggregator without a file of its own.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub(crate) links: Links,
}

impl Dependable for Group {
    fn links(&self) -> &Links {
        &self.links
    }
}

/// A node of the asset graph.
#[derive(Debug, Clone)]
pub enum Node {
    Resource(Resource),
    Slot(Slot),
    Group(Group),
}

impl Node {
    /// The owning library; groups have none.
    pub fn library(&self) -> Option<LibraryId> {
        match self {
            Node::Resource(resource) => Some(resource.library),
            Node::Slot(slot) => Some(slot.library),
            Node::Group(_) => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Node::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn as_slot(&self) -> Option<&Slot> {
        match self {
            Node::Slot(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub(crate) fn links_mut(&mut self) -> &mut Links {
        match self {
            Node::Resource(resource) => &mut resource.links,
            Node::Slot(slot) => &mut slot.links,
            Node::Group(group) => &mut group.links,
        }
    }
}

impl Dependable for Node {
    fn links(&self) -> &Links {
        match self {
            Node::Resource(resource) => &resource.links,
            Node::Slot(slot) => &slot.links,
            Node::Group(group) => &group.links,
        }
    }
}

/// Split a relative path into `(dirname, filename, ext)`.
///
/// The dirname keeps a trailing `/` so that `dirname + filename == relpath`.
pub(crate) fn split_relpath(relpath: &str) -> (String, String, String) {
    let (dirname, filename) = match relpath.rfind('/') {
        Some(pos) => (&relpath[..=pos], &relpath[pos + 1..]),
        None => ("", relpath),
    };
    let ext = match filename.rfind('.') {
        Some(pos) if pos > 0 => &filename[pos..],
        _ => "",
    };
    (dirname.to_string(), filename.to_string(), ext.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.js", "", "a.js", ".js")]
    #[case("sub/b.css", "sub/", "b.css", ".css")]
    #[case("deep/er/c.min.js", "deep/er/", "c.min.js", ".js")]
    #[case(".htaccess", "", ".htaccess", "")]
    #[case("noext", "", "noext", "")]
    fn relpath_parts(
        #[case] relpath: &str,
        #[case] dirname: &str,
        #[case] filename: &str,
        #[case] ext: &str,
    ) {
        let parts = split_relpath(relpath);
        assert_eq!(parts, (dirname.into(), filename.into(), ext.into()));
    }
}
