//! The asset registry
//!
//! The [`Registry`] owns every library and graph node. It is built once at
//! startup through `&mut` declarations, prepared (see [`crate::prepare`]) and
//! then shared read-only, typically behind an `Arc`, with every needed set.
//!
//! # Example
//!
//! ```
//! use asset_core::{Library, Registry, ResourceSpec};
//!
//! let mut registry = Registry::new();
//! let foo = registry.add_library(Library::new("foo", "/srv/foo")).unwrap();
//! let a1 = registry.add_resource(ResourceSpec::new(foo, "a1.js")).unwrap();
//! let a2 = registry
//!     .add_resource(ResourceSpec::new(foo, "a2.js").depends([a1]))
//!     .unwrap();
//!
//! assert!(registry.list_supporting(a1).contains(&a2));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::ops::Index;
use std::sync::{Mutex, OnceLock};

use crate::config::RegistryOptions;
use crate::graph::{
    AssetId, DEBUG, Dependable, Group, LibraryId, Links, MINIFIED, Node, Resource, Slot,
    split_relpath,
};
use crate::library::Library;
use crate::prepare::Ranks;
use crate::renderer::{Renderer, RendererRegistry};
use crate::{Error, Result};

/// How an alternate rendition of a resource is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeSpec {
    /// A new resource at this path, inheriting the parent's settings.
    Path(String),
    /// An already declared resource.
    Resource(AssetId),
}

impl From<&str> for ModeSpec {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for ModeSpec {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<AssetId> for ModeSpec {
    fn from(id: AssetId) -> Self {
        Self::Resource(id)
    }
}

/// Declaration of a resource.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    library: LibraryId,
    relpath: String,
    depends: Vec<AssetId>,
    supersedes: Vec<AssetId>,
    bottom: bool,
    dont_bundle: bool,
    renderer: Option<Renderer>,
    modes: Vec<(String, ModeSpec)>,
}

impl ResourceSpec {
    pub fn new(library: LibraryId, relpath: impl Into<String>) -> Self {
        Self {
            library,
            relpath: relpath.into(),
            depends: Vec::new(),
            supersedes: Vec::new(),
            bottom: false,
            dont_bundle: false,
            renderer: None,
            modes: Vec::new(),
        }
    }

    pub fn depends(mut self, depends: impl IntoIterator<Item = AssetId>) -> Self {
        self.depends.extend(depends);
        self
    }

    /// Make this resource a rollup of `supersedes`.
    pub fn supersedes(mut self, supersedes: impl IntoIterator<Item = AssetId>) -> Self {
        self.supersedes.extend(supersedes);
        self
    }

    /// Mark the resource safe to include at the bottom of the page.
    pub fn bottom(mut self, bottom: bool) -> Self {
        self.bottom = bottom;
        self
    }

    pub fn dont_bundle(mut self, dont_bundle: bool) -> Self {
        self.dont_bundle = dont_bundle;
        self
    }

    /// Use a custom renderer instead of the one registered for the extension.
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn debug(self, mode: impl Into<ModeSpec>) -> Self {
        self.mode(DEBUG, mode)
    }

    pub fn minified(self, mode: impl Into<ModeSpec>) -> Self {
        self.mode(MINIFIED, mode)
    }

    /// Declare an alternate rendition under an arbitrary mode name.
    pub fn mode(mut self, name: impl Into<String>, mode: impl Into<ModeSpec>) -> Self {
        self.modes.push((name.into(), mode.into()));
        self
    }
}

/// Declaration of a slot.
#[derive(Debug, Clone)]
pub struct SlotSpec {
    library: LibraryId,
    ext: String,
    depends: Vec<AssetId>,
    required: Option<bool>,
    default: Option<AssetId>,
}

impl SlotSpec {
    /// A slot in `library` accepting resources with extension `ext` (with
    /// leading dot).
    pub fn new(library: LibraryId, ext: impl Into<String>) -> Self {
        Self {
            library,
            ext: ext.into(),
            depends: Vec::new(),
            required: None,
            default: None,
        }
    }

    /// The maximum dependency set a filler may have.
    pub fn depends(mut self, depends: impl IntoIterator<Item = AssetId>) -> Self {
        self.depends.extend(depends);
        self
    }

    /// Whether the slot must be filled. Defaults to `true` without a default
    /// resource.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Resource used when a need does not fill the slot.
    pub fn default(mut self, resource: AssetId) -> Self {
        self.default = Some(resource);
        self
    }
}

/// Registry of libraries and the asset graph declared in them.
#[derive(Debug)]
pub struct Registry {
    options: RegistryOptions,
    renderers: RendererRegistry,
    pub(crate) libraries: Vec<Library>,
    library_names: HashMap<String, LibraryId>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) prepare_lock: Mutex<()>,
    pub(crate) ranks: OnceLock<Ranks>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_options(RegistryOptions::default())
    }
}

impl Registry {
    /// Create an empty registry with the built-in renderers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            options,
            renderers: RendererRegistry::default(),
            libraries: Vec::new(),
            library_names: HashMap::new(),
            nodes: Vec::new(),
            prepare_lock: Mutex::new(()),
            ranks: OnceLock::new(),
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    /// Mutable access to the renderer table, for registering extensions
    /// before resources using them are declared.
    pub fn renderers_mut(&mut self) -> Result<&mut RendererRegistry> {
        self.ensure_mutable()?;
        Ok(&mut self.renderers)
    }

    /// Add a library. Names are unique.
    pub fn add_library(&mut self, library: Library) -> Result<LibraryId> {
        self.ensure_mutable()?;
        if self.library_names.contains_key(library.name()) {
            return Err(Error::configuration(format!(
                "Library '{}' is already registered",
                library.name()
            )));
        }
        let id = LibraryId(self.libraries.len() as u32);
        tracing::debug!(library = library.name(), path = %library.path().display(), "Registered library");
        self.library_names.insert(library.name().to_string(), id);
        self.libraries.push(library);
        Ok(id)
    }

    pub fn library_by_name(&self, name: &str) -> Option<LibraryId> {
        self.library_names.get(name).copied()
    }

    pub fn get_library(&self, id: LibraryId) -> Option<&Library> {
        self.libraries.get(id.index())
    }

    /// All libraries in registration order.
    pub fn libraries(&self) -> impl Iterator<Item = (LibraryId, &Library)> {
        self.libraries
            .iter()
            .enumerate()
            .map(|(index, library)| (LibraryId(index as u32), library))
    }

    pub fn get(&self, id: AssetId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn resource(&self, id: AssetId) -> Option<&Resource> {
        self.get(id).and_then(Node::as_resource)
    }

    pub fn slot(&self, id: AssetId) -> Option<&Slot> {
        self.get(id).and_then(Node::as_slot)
    }

    /// Number of graph nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Human-readable description of a node for messages.
    pub fn describe(&self, id: AssetId) -> String {
        match self.get(id) {
            Some(Node::Resource(resource)) => format!(
                "<Resource '{}' in library '{}'>",
                resource.relpath,
                self[resource.library].name()
            ),
            Some(Node::Slot(slot)) => format!(
                "<Slot {} '{}' in library '{}'>",
                id,
                slot.ext,
                self[slot.library].name()
            ),
            Some(Node::Group(_)) => format!("<Group {id}>"),
            None => format!("<unknown asset {id}>"),
        }
    }

    /// The rendition of `id` in `mode`, or `id` itself when it has none.
    pub fn mode(&self, id: AssetId, mode: &str) -> AssetId {
        self.resource(id)
            .and_then(|resource| resource.mode(mode))
            .unwrap_or(id)
    }

    /// Leaf assets of a node: a group's are the leaf assets of its
    /// dependencies, a resource or slot is its own leaf.
    pub fn list_assets(&self, id: AssetId) -> BTreeSet<AssetId> {
        match &self[id] {
            Node::Group(group) => group
                .depends()
                .iter()
                .flat_map(|&dep| self.list_assets(dep))
                .collect(),
            _ => BTreeSet::from([id]),
        }
    }

    /// Every node that (transitively) depends on `id`.
    pub fn list_supporting(&self, id: AssetId) -> BTreeSet<AssetId> {
        let mut supporting = BTreeSet::new();
        let mut queue: VecDeque<AssetId> = self[id].supports().iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if supporting.insert(current) {
                queue.extend(self[current].supports().iter().copied());
            }
        }
        supporting
    }

    /// Declare a resource.
    ///
    /// Path modes are declared as resources of their own in the same
    /// library, inheriting dependencies, flags and renderer.
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` for a duplicate path, an unknown handle, a
    ///   non-resource in `supersedes`, or a registry that is already prepared
    /// - `Error::UnknownExtension` when no renderer handles the extension
    /// - `Error::UnknownResource` when file checking is on and the file is
    ///   missing
    /// - `Error::ModeDependency` when an existing mode resource has
    ///   dependencies outside this resource's
    /// - `Error::LibraryDependencyCycle`
    pub fn add_resource(&mut self, spec: ResourceSpec) -> Result<AssetId> {
        self.ensure_mutable()?;
        self.check_library(spec.library)?;
        let depends = self.check_depends(&spec.depends)?;

        let mut supersedes = Vec::new();
        for &id in &spec.supersedes {
            if self.resource(id).is_none() {
                return Err(Error::configuration(format!(
                    "{} supersedes {}, which is not a resource",
                    spec.relpath,
                    self.describe(id)
                )));
            }
            if !supersedes.contains(&id) {
                supersedes.push(id);
            }
        }

        let mut batch_paths = HashSet::new();
        let mut parent = self.build_resource(&spec, &spec.relpath, &mut batch_paths)?;
        let mut path_modes = Vec::new();
        for (name, mode) in &spec.modes {
            match mode {
                ModeSpec::Path(path) => {
                    path_modes.push((name.clone(), self.build_resource(&spec, path, &mut batch_paths)?));
                }
                ModeSpec::Resource(id) => {
                    let Some(existing) = self.resource(*id) else {
                        return Err(Error::configuration(format!(
                            "Mode '{name}' of {} is {}, which is not a resource",
                            spec.relpath,
                            self.describe(*id)
                        )));
                    };
                    if !existing.depends().is_subset(&depends) {
                        return Err(Error::ModeDependency {
                            asset: spec.relpath.clone(),
                            mode: name.clone(),
                        });
                    }
                    parent.modes.insert(name.clone(), *id);
                }
            }
        }

        let description = format!(
            "<Resource '{}' in library '{}'>",
            spec.relpath,
            self[spec.library].name()
        );
        let dep_libraries = self.closure_libraries(&depends);
        self.check_library_cycles(
            &description,
            &BTreeMap::from([(spec.library, dep_libraries.clone())]),
        )?;

        for (name, mut mode_resource) in path_modes {
            mode_resource.links.depends = depends.clone();
            let mode_id = self.insert_node(Node::Resource(mode_resource));
            parent.modes.insert(name, mode_id);
        }
        parent.links.depends = depends;
        parent.supersedes = supersedes.clone();
        let id = self.insert_node(Node::Resource(parent));
        for superseded in supersedes {
            if let Node::Resource(resource) = &mut self.nodes[superseded.index()] {
                resource.rollups.push(id);
            }
        }
        self.record_library_deps(spec.library, dep_libraries);

        tracing::debug!(resource = %description, id = %id, "Declared resource");
        Ok(id)
    }

    /// Declare a slot.
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` when the extension has no leading dot, or a
    ///   default is combined with an explicit `required(true)`
    /// - `Error::Slot` when the default resource cannot fill the slot
    /// - `Error::LibraryDependencyCycle`
    pub fn add_slot(&mut self, spec: SlotSpec) -> Result<AssetId> {
        self.ensure_mutable()?;
        self.check_library(spec.library)?;
        if !spec.ext.starts_with('.') {
            return Err(Error::configuration(format!(
                "Slot extension '{}' must start with a dot",
                spec.ext
            )));
        }
        if spec.required == Some(true) && spec.default.is_some() {
            return Err(Error::configuration(
                "A slot with a default is not required and can not be made required",
            ));
        }
        let depends = self.check_depends(&spec.depends)?;
        if let Some(default) = spec.default {
            self.validate_fill(&spec.ext, &depends, default)?;
        }

        let description = format!(
            "<Slot '{}' in library '{}'>",
            spec.ext,
            self[spec.library].name()
        );
        let dep_libraries = self.closure_libraries(&depends);
        self.check_library_cycles(
            &description,
            &BTreeMap::from([(spec.library, dep_libraries.clone())]),
        )?;

        let slot = Slot {
            library: spec.library,
            ext: spec.ext,
            required: spec.required.unwrap_or(spec.default.is_none()),
            default: spec.default,
            links: Links {
                depends,
                ..Links::default()
            },
        };
        let id = self.insert_node(Node::Slot(slot));
        self.record_library_deps(spec.library, dep_libraries);

        tracing::debug!(slot = %description, id = %id, "Declared slot");
        Ok(id)
    }

    /// Declare a group of dependencies.
    pub fn add_group(&mut self, depends: impl IntoIterator<Item = AssetId>) -> Result<AssetId> {
        self.ensure_mutable()?;
        let depends: Vec<AssetId> = depends.into_iter().collect();
        let depends = self.check_depends(&depends)?;
        let id = self.insert_node(Node::Group(Group {
            links: Links {
                depends,
                ..Links::default()
            },
        }));
        tracing::debug!(id = %id, "Declared group");
        Ok(id)
    }

    /// Make `node` depend on `dep` after both were declared.
    ///
    /// The closure of `node` and of every node supporting it grows by the
    /// closure of `dep`. Adding an existing edge is a no-op.
    ///
    /// # Errors
    ///
    /// - `Error::DependencyCycle` when `dep` is `node` or depends on it
    /// - `Error::LibraryDependencyCycle`
    /// - `Error::Configuration` for unknown handles or a prepared registry
    pub fn add_dependency(&mut self, node: AssetId, dep: AssetId) -> Result<()> {
        self.ensure_mutable()?;
        self.check_asset(node)?;
        self.check_asset(dep)?;
        if self[node].depends().contains(&dep) {
            return Ok(());
        }

        let supporting = self.list_supporting(node);
        if dep == node || supporting.contains(&dep) {
            return Err(Error::DependencyCycle {
                asset: self.describe(node),
                dependency: self.describe(dep),
            });
        }

        let added: BTreeSet<AssetId> = self[dep].resources().clone();
        let added_libraries = self.closure_libraries(&BTreeSet::from([dep]));
        let mut additions: BTreeMap<LibraryId, BTreeSet<LibraryId>> = BTreeMap::new();
        for affected in std::iter::once(node).chain(supporting.iter().copied()) {
            if let Some(library) = self[affected].library() {
                additions
                    .entry(library)
                    .or_default()
                    .extend(added_libraries.iter().copied());
            }
        }
        self.check_library_cycles(&self.describe(node), &additions)?;

        self.nodes[dep.index()].links_mut().supports.insert(node);
        let links = self.nodes[node.index()].links_mut();
        links.depends.insert(dep);
        links.resources.extend(added.iter().copied());
        for supporter in supporting {
            self.nodes[supporter.index()]
                .links_mut()
                .resources
                .extend(added.iter().copied());
        }
        for (library, libraries) in additions {
            self.record_library_deps(library, libraries);
        }

        tracing::debug!(asset = %self.describe(node), dependency = %self.describe(dep), "Added dependency");
        Ok(())
    }

    /// Check that `filler` may fill `slot`: both must be of the right kind,
    /// extensions must be equal and the filler's dependencies must be a
    /// subset of the slot's.
    pub fn check_slot_fill(&self, slot: AssetId, filler: AssetId) -> Result<()> {
        let Some(slot_node) = self.slot(slot) else {
            return Err(Error::slot(format!("{} is not a slot", self.describe(slot))));
        };
        self.validate_fill(&slot_node.ext, slot_node.depends(), filler)
    }

    fn validate_fill(&self, ext: &str, depends: &BTreeSet<AssetId>, filler: AssetId) -> Result<()> {
        let Some(resource) = self.resource(filler) else {
            return Err(Error::slot(format!(
                "slot filled with {}, which is not a resource",
                self.describe(filler)
            )));
        };
        if resource.ext != ext {
            return Err(Error::slot(format!(
                "slot requires extension {} but filled with resource with extension {}",
                ext, resource.ext
            )));
        }
        if !resource.depends().is_subset(depends) {
            return Err(Error::slot(format!(
                "slot filled in with {}, which has dependencies that are not a subset of dependencies of slot",
                self.describe(filler)
            )));
        }
        Ok(())
    }

    pub(crate) fn ensure_mutable(&self) -> Result<()> {
        if self.is_prepared() {
            return Err(Error::configuration(
                "Registry is already prepared; libraries and assets can no longer be added",
            ));
        }
        Ok(())
    }

    fn check_library(&self, id: LibraryId) -> Result<&Library> {
        self.libraries
            .get(id.index())
            .ok_or_else(|| Error::configuration(format!("Unknown library handle {}", id.index())))
    }

    fn check_asset(&self, id: AssetId) -> Result<&Node> {
        self.get(id)
            .ok_or_else(|| Error::configuration(format!("Unknown asset handle {id}")))
    }

    fn check_depends(&self, depends: &[AssetId]) -> Result<BTreeSet<AssetId>> {
        depends
            .iter()
            .map(|&id| self.check_asset(id).map(|_| id))
            .collect()
    }

    /// Validate the parts of a resource declaration that do not depend on the
    /// graph and build the node without links.
    fn build_resource(
        &self,
        spec: &ResourceSpec,
        relpath: &str,
        batch_paths: &mut HashSet<String>,
    ) -> Result<Resource> {
        let library = &self[spec.library];
        if library.known_resources.contains_key(relpath) || !batch_paths.insert(relpath.to_string()) {
            return Err(Error::configuration(format!(
                "Resource path {relpath} is already defined in library '{}'",
                library.name()
            )));
        }

        let (dirname, filename, ext) = split_relpath(relpath);
        let (order, renderer) = match &spec.renderer {
            Some(renderer) => (
                self.renderers.order_of(&ext).unwrap_or(usize::MAX),
                renderer.clone(),
            ),
            None => match self.renderers.get(&ext) {
                Some((order, renderer)) => (order, renderer.clone()),
                None => {
                    return Err(Error::UnknownExtension {
                        extension: ext,
                        asset: format!("<Resource '{relpath}' in library '{}'>", library.name()),
                    });
                }
            },
        };

        if self.options.check_files {
            let fullpath = library.path().join(relpath);
            if !fullpath.exists() {
                return Err(Error::UnknownResource {
                    message: format!("Resource file does not exist: {}", fullpath.display()),
                });
            }
        }

        Ok(Resource {
            library: spec.library,
            relpath: relpath.to_string(),
            dirname,
            filename,
            ext,
            order,
            renderer,
            bottom: spec.bottom,
            dont_bundle: spec.dont_bundle,
            modes: BTreeMap::new(),
            supersedes: Vec::new(),
            rollups: Vec::new(),
            links: Links::default(),
        })
    }

    /// Push a node whose `depends` are set, wiring back-references and the
    /// closure. New nodes have no supporters, so nothing else changes.
    fn insert_node(&mut self, mut node: Node) -> AssetId {
        let id = AssetId(self.nodes.len() as u32);
        let depends = node.depends().clone();

        let mut resources = BTreeSet::new();
        if !node.is_group() {
            resources.insert(id);
        }
        for dep in &depends {
            resources.extend(self.nodes[dep.index()].resources().iter().copied());
        }
        node.links_mut().resources = resources;

        match &node {
            Node::Resource(resource) => {
                let library = &mut self.libraries[resource.library.index()];
                library.known_resources.insert(resource.relpath.clone(), id);
                library.known_assets.push(id);
            }
            Node::Slot(slot) => self.libraries[slot.library.index()].known_assets.push(id),
            Node::Group(_) => {}
        }

        self.nodes.push(node);
        for dep in depends {
            self.nodes[dep.index()].links_mut().supports.insert(id);
        }
        id
    }

    /// Libraries of every concrete asset in the closure of `depends`.
    fn closure_libraries(&self, depends: &BTreeSet<AssetId>) -> BTreeSet<LibraryId> {
        depends
            .iter()
            .flat_map(|&dep| self[dep].resources().iter().copied())
            .filter_map(|id| self[id].library())
            .collect()
    }

    fn record_library_deps(&mut self, library: LibraryId, libraries: BTreeSet<LibraryId>) {
        let deps = &mut self.libraries[library.index()].library_deps;
        deps.insert(library);
        deps.extend(libraries);
    }

    fn hypothetical_deps(
        &self,
        library: LibraryId,
        additions: &BTreeMap<LibraryId, BTreeSet<LibraryId>>,
    ) -> BTreeSet<LibraryId> {
        let mut deps = self[library].library_deps.clone();
        if let Some(extra) = additions.get(&library) {
            deps.extend(extra.iter().copied());
        }
        deps
    }

    /// Reject `additions` (library -> newly depended-on libraries) if any
    /// library would then depend on a library that depends back on it.
    fn check_library_cycles(
        &self,
        asset: &str,
        additions: &BTreeMap<LibraryId, BTreeSet<LibraryId>>,
    ) -> Result<()> {
        for &owner in additions.keys() {
            for other in self.hypothetical_deps(owner, additions) {
                if other == owner {
                    continue;
                }
                let mut seen = BTreeSet::new();
                let mut queue = VecDeque::from([other]);
                while let Some(current) = queue.pop_front() {
                    if current == owner {
                        return Err(Error::LibraryDependencyCycle {
                            asset: asset.to_string(),
                            library: self[owner].name().to_string(),
                            other: self[other].name().to_string(),
                        });
                    }
                    if seen.insert(current) {
                        queue.extend(self.hypothetical_deps(current, additions));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Index<AssetId> for Registry {
    type Output = Node;

    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    fn index(&self, id: AssetId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Index<LibraryId> for Registry {
    type Output = Library;

    /// # Panics
    ///
    /// Panics if `id` was not issued by this registry.
    fn index(&self, id: LibraryId) -> &Library {
        &self.libraries[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> (Registry, Vec<LibraryId>) {
        let mut registry = Registry::new();
        let ids = names
            .iter()
            .map(|name| registry.add_library(Library::new(*name, "")).unwrap())
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_duplicate_library_name() {
        let (mut registry, _) = registry_with(&["foo"]);
        let err = registry.add_library(Library::new("foo", "")).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_resource_closure_includes_itself_and_dependencies() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let b = registry
            .add_resource(ResourceSpec::new(libs[0], "b.js").depends([a]))
            .unwrap();

        assert_eq!(registry[b].resources(), &BTreeSet::from([a, b]));
        assert_eq!(registry[a].supports(), &BTreeSet::from([b]));
    }

    #[test]
    fn test_group_closure_excludes_itself() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let b = registry.add_resource(ResourceSpec::new(libs[0], "b.js")).unwrap();
        let group = registry.add_group([a, b]).unwrap();

        assert_eq!(registry[group].resources(), &BTreeSet::from([a, b]));
        assert_eq!(registry.list_assets(group), BTreeSet::from([a, b]));
        assert_eq!(registry.list_assets(a), BTreeSet::from([a]));
    }

    #[test]
    fn test_nested_group_list_assets() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let x = registry.add_resource(ResourceSpec::new(libs[0], "x.js")).unwrap();
        let y = registry
            .add_resource(ResourceSpec::new(libs[0], "y.js").depends([x]))
            .unwrap();
        let inner = registry.add_group([y]).unwrap();
        let outer = registry.add_group([inner]).unwrap();

        // Leaf assets stop at the first concrete node, the closure does not.
        assert_eq!(registry.list_assets(outer), BTreeSet::from([y]));
        assert_eq!(registry[outer].resources(), &BTreeSet::from([x, y]));
    }

    #[test]
    fn test_add_dependency_propagates_to_supporters() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let b = registry
            .add_resource(ResourceSpec::new(libs[0], "b.js").depends([a]))
            .unwrap();
        let group = registry.add_group([b]).unwrap();
        let c = registry.add_resource(ResourceSpec::new(libs[0], "c.js")).unwrap();

        registry.add_dependency(a, c).unwrap();

        assert!(registry[a].resources().contains(&c));
        assert!(registry[b].resources().contains(&c));
        assert!(registry[group].resources().contains(&c));
        assert_eq!(registry[c].supports(), &BTreeSet::from([a]));
    }

    #[test]
    fn test_add_dependency_twice_is_noop() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let b = registry
            .add_resource(ResourceSpec::new(libs[0], "b.js").depends([a]))
            .unwrap();
        registry.add_dependency(b, a).unwrap();
        assert_eq!(registry[b].depends(), &BTreeSet::from([a]));
    }

    #[test]
    fn test_add_dependency_rejects_cycles() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let b = registry
            .add_resource(ResourceSpec::new(libs[0], "b.js").depends([a]))
            .unwrap();
        let c = registry
            .add_resource(ResourceSpec::new(libs[0], "c.js").depends([b]))
            .unwrap();

        assert!(matches!(
            registry.add_dependency(a, c),
            Err(Error::DependencyCycle { .. })
        ));
        assert!(matches!(
            registry.add_dependency(a, a),
            Err(Error::DependencyCycle { .. })
        ));
        // The rejected edge left nothing behind.
        assert!(registry[c].supports().is_empty());
        assert_eq!(registry[a].resources(), &BTreeSet::from([a]));
    }

    #[test]
    fn test_duplicate_path_in_library() {
        let (mut registry, libs) = registry_with(&["foo", "bar"]);
        registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let err = registry
            .add_resource(ResourceSpec::new(libs[0], "a.js"))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        // Same path in another library is fine.
        registry.add_resource(ResourceSpec::new(libs[1], "a.js")).unwrap();
    }

    #[test]
    fn test_unknown_extension() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let err = registry
            .add_resource(ResourceSpec::new(libs[0], "a.unknown"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownExtension { ref extension, .. } if extension == ".unknown"));
    }

    #[test]
    fn test_custom_renderer_for_unknown_extension_orders_last() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let id = registry
            .add_resource(
                ResourceSpec::new(libs[0], "a.unknown")
                    .renderer(Renderer::new("special", |url| format!("<special href=\"{url}\"/>"))),
            )
            .unwrap();
        let resource = registry.resource(id).unwrap();
        assert_eq!(resource.order(), usize::MAX);
        assert_eq!(resource.render("/lib"), "<special href=\"/lib/a.unknown\"/>");
    }

    #[test]
    fn test_supersedes_sets_rollups() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let b1 = registry.add_resource(ResourceSpec::new(libs[0], "b1.js")).unwrap();
        let b2 = registry.add_resource(ResourceSpec::new(libs[0], "b2.js")).unwrap();
        let giant = registry
            .add_resource(ResourceSpec::new(libs[0], "giant.js").supersedes([b1, b2, b1]))
            .unwrap();

        assert_eq!(registry.resource(giant).unwrap().supersedes(), &[b1, b2]);
        assert_eq!(registry.resource(b1).unwrap().rollups(), &[giant]);
        assert_eq!(registry.resource(b2).unwrap().rollups(), &[giant]);
    }

    #[test]
    fn test_library_dependency_cycle_direct() {
        let (mut registry, libs) = registry_with(&["A", "B"]);
        let (a, b) = (libs[0], libs[1]);
        let a1 = registry.add_resource(ResourceSpec::new(a, "a1.js")).unwrap();
        let b1 = registry.add_resource(ResourceSpec::new(b, "b1.js")).unwrap();
        registry
            .add_resource(ResourceSpec::new(a, "a2.js").depends([b1]))
            .unwrap();

        let err = registry
            .add_resource(ResourceSpec::new(b, "b2.js").depends([a1]))
            .unwrap_err();
        assert!(matches!(err, Error::LibraryDependencyCycle { .. }));
        // Nothing was registered for the rejected declaration.
        assert!(registry[b].known_resource("b2.js").is_none());
    }

    #[test]
    fn test_library_dependency_cycle_indirect() {
        let (mut registry, libs) = registry_with(&["C", "D", "E"]);
        let (c, d, e) = (libs[0], libs[1], libs[2]);
        let c1 = registry.add_resource(ResourceSpec::new(c, "c1.js")).unwrap();
        registry
            .add_resource(ResourceSpec::new(d, "d1.js").depends([c1]))
            .unwrap();
        let d2 = registry.add_resource(ResourceSpec::new(d, "d2.js")).unwrap();
        let e1 = registry
            .add_resource(ResourceSpec::new(e, "e1.js").depends([d2]))
            .unwrap();

        let err = registry
            .add_resource(ResourceSpec::new(c, "c2.js").depends([e1]))
            .unwrap_err();
        assert!(matches!(err, Error::LibraryDependencyCycle { .. }));
    }

    #[test]
    fn test_library_cycle_through_late_dependency() {
        let (mut registry, libs) = registry_with(&["A", "B"]);
        let a1 = registry.add_resource(ResourceSpec::new(libs[0], "a1.js")).unwrap();
        let b1 = registry.add_resource(ResourceSpec::new(libs[1], "b1.js")).unwrap();
        registry.add_dependency(a1, b1).unwrap();

        let err = registry.add_dependency(b1, a1).unwrap_err();
        // The asset cycle is found before the library cycle.
        assert!(matches!(err, Error::DependencyCycle { .. }));

        let b2 = registry.add_resource(ResourceSpec::new(libs[1], "b2.js")).unwrap();
        let a2 = registry.add_resource(ResourceSpec::new(libs[0], "a2.js")).unwrap();
        let err = registry.add_dependency(b2, a2).unwrap_err();
        assert!(matches!(err, Error::LibraryDependencyCycle { .. }));
    }

    #[test]
    fn test_slot_with_default_cannot_be_required() {
        let (mut registry, libs) = registry_with(&["lib"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let err = registry
            .add_slot(SlotSpec::new(libs[0], ".js").default(a).required(true))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));

        let slot = registry
            .add_slot(SlotSpec::new(libs[0], ".js").default(a))
            .unwrap();
        assert!(!registry.slot(slot).unwrap().required());
    }

    #[test]
    fn test_slot_extension_needs_dot() {
        let (mut registry, libs) = registry_with(&["lib"]);
        let err = registry.add_slot(SlotSpec::new(libs[0], "js")).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_slot_default_must_fit() {
        let (mut registry, libs) = registry_with(&["lib"]);
        let css = registry.add_resource(ResourceSpec::new(libs[0], "a.css")).unwrap();
        let err = registry
            .add_slot(SlotSpec::new(libs[0], ".js").default(css))
            .unwrap_err();
        assert!(matches!(err, Error::Slot { .. }));
    }

    #[test]
    fn test_path_mode_inherits_settings() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let k = registry
            .add_resource(
                ResourceSpec::new(libs[0], "k.js")
                    .debug("k-debug.js")
                    .depends([a])
                    .dont_bundle(true)
                    .renderer(Renderer::new("special", |url| format!("<special href=\"{url}\"/>"))),
            )
            .unwrap();

        let debug = registry.mode(k, DEBUG);
        assert_ne!(debug, k);
        let debug_resource = registry.resource(debug).unwrap();
        assert_eq!(debug_resource.relpath(), "k-debug.js");
        assert_eq!(registry[debug].depends(), registry[k].depends());
        assert_eq!(debug_resource.renderer().name(), "special");
        assert!(debug_resource.dont_bundle());
        assert_eq!(registry[libs[0]].known_resource("k-debug.js"), Some(debug));
        // Unknown modes fall back to the resource itself.
        assert_eq!(registry.mode(k, MINIFIED), k);
    }

    #[test]
    fn test_existing_mode_must_not_add_dependencies() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        let k_debug = registry
            .add_resource(ResourceSpec::new(libs[0], "k-debug.js").depends([a]))
            .unwrap();
        let err = registry
            .add_resource(ResourceSpec::new(libs[0], "k.js").debug(k_debug))
            .unwrap_err();
        assert!(matches!(err, Error::ModeDependency { .. }));

        let k = registry
            .add_resource(ResourceSpec::new(libs[0], "k.js").depends([a]).debug(k_debug))
            .unwrap();
        assert_eq!(registry.mode(k, DEBUG), k_debug);
    }

    #[test]
    fn test_mode_path_collision_rejected_atomically() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let err = registry
            .add_resource(ResourceSpec::new(libs[0], "k.js").debug("k.js"))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_file_existence_checking() {
        let tree = asset_test_utils::tree::LibraryTree::sample();
        let mut registry = Registry::with_options(RegistryOptions { check_files: true });
        let lib = registry
            .add_library(Library::new("sample", tree.root()))
            .unwrap();

        registry.add_resource(ResourceSpec::new(lib, "js/app.js")).unwrap();
        let err = registry
            .add_resource(ResourceSpec::new(lib, "js/missing.js"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownResource { .. }));
    }

    #[test]
    fn test_describe() {
        let (mut registry, libs) = registry_with(&["foo"]);
        let a = registry.add_resource(ResourceSpec::new(libs[0], "a.js")).unwrap();
        assert_eq!(registry.describe(a), "<Resource 'a.js' in library 'foo'>");
    }
}
