//! Bundling of adjacent resources
//!
//! Sorted resources of one library that share a renderer and a directory can
//! be served from a single URL:
//!
//! ```text
//! /assets/lib/js/:bundle:jquery.js;plugin.js
//! ```
//!
//! [`Registry::resolve_bundle`] turns such a path back into its members for
//! whatever serves the files.

use std::collections::HashSet;

use crate::graph::{AssetId, LibraryId};
use crate::registry::Registry;
use crate::renderable::{Bundle, Renderable, checked};
use crate::{Error, Result};

/// Marks the start of the member list in a bundle path.
pub const BUNDLE_PREFIX: &str = ":bundle:";

/// Group adjacent compatible renderables into bundles.
///
/// `resources` must already be sorted. Renderables flagged `dont_bundle`
/// close the current bundle and stay on their own; a bundle of one is
/// emitted as its single member.
///
/// # Errors
///
/// Returns an error when a renderable does not check out against `registry`
/// (see [`Renderable::check`]).
pub fn bundle_resources(
    registry: &Registry,
    resources: impl IntoIterator<Item = Renderable>,
) -> Result<Vec<Renderable>> {
    Ok(bundle_checked(registry, checked(registry, resources)?))
}

pub(crate) fn bundle_checked(registry: &Registry, resources: Vec<Renderable>) -> Vec<Renderable> {
    let mut result = Vec::new();
    let mut current: Vec<Renderable> = Vec::new();
    for resource in resources {
        if fits(registry, &current, &resource) {
            current.push(resource);
            continue;
        }
        flush(&mut result, std::mem::take(&mut current));
        if resource.dont_bundle(registry) {
            result.push(resource);
        } else {
            current.push(resource);
        }
    }
    flush(&mut result, current);
    result
}

fn fits(registry: &Registry, bundle: &[Renderable], resource: &Renderable) -> bool {
    if resource.dont_bundle(registry) {
        return false;
    }
    let Some(first) = bundle.first() else {
        return true;
    };
    first.library(registry) == resource.library(registry)
        && first.renderer(registry) == resource.renderer(registry)
        && first.dirname(registry) == resource.dirname(registry)
}

fn flush(result: &mut Vec<Renderable>, mut members: Vec<Renderable>) {
    match members.len() {
        0 => {}
        1 => result.extend(members.pop()),
        _ => result.push(Renderable::Bundle(Bundle { members })),
    }
}

impl Registry {
    /// Resolve a bundle request path of `library` into its member resources.
    ///
    /// `path` is relative to the library root, e.g. `js/:bundle:a.js;b.js`
    /// (a leading `/` is ignored). Prepares the registry.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownResource` when the path is not a bundle path, a
    /// member is not a declared resource of the library, members are out of
    /// dependency order, or a member appears twice.
    pub fn resolve_bundle(&self, library: LibraryId, path: &str) -> Result<Vec<AssetId>> {
        let ranks = self.prepare();
        let lib = &self[library];
        let unknown = |reason: &str| Error::UnknownResource {
            message: format!("{reason} in bundle '{path}' of library '{}'", lib.name()),
        };

        let path = path.trim_start_matches('/');
        let Some((subdir, members)) = path.split_once(BUNDLE_PREFIX) else {
            return Err(unknown("no bundle marker"));
        };

        let mut seen = HashSet::new();
        let mut dependency_nr = 0;
        let mut resolved = Vec::new();
        for filename in members.split(';') {
            let relpath = format!("{subdir}{filename}");
            let Some(id) = lib.known_resource(&relpath) else {
                return Err(unknown(&format!("unknown resource '{relpath}'")));
            };
            let nr = ranks.dependency_nr(id);
            if nr < dependency_nr {
                return Err(unknown(&format!("'{relpath}' out of dependency order")));
            }
            dependency_nr = nr;
            if !seen.insert(filename) {
                return Err(unknown(&format!("duplicate '{relpath}'")));
            }
            resolved.push(id);
        }
        Ok(resolved)
    }
}
