//! Deterministic page order

use crate::Result;
use crate::registry::Registry;
use crate::renderable::{Renderable, checked};

/// Sort renderables for inclusion in a page.
///
/// The key is `(renderer order, library rank, library name, dependency rank,
/// relative path)`:
///
/// - renderables are grouped per renderer class (`.css` before `.js`, ...)
/// - within a class, dependencies come before what depends on them
/// - renderables of one library stay together when the ranks allow it, which
///   is what makes bundling effective
///
/// The result does not depend on the input order. A filled slot is placed
/// by the slot's library and rank, so it lands before whatever depends on
/// the slot even when the filler comes from another library.
///
/// # Errors
///
/// Returns an error when a renderable does not check out against `registry`
/// (see [`Renderable::check`]).
pub fn sort_resources(
    registry: &Registry,
    resources: impl IntoIterator<Item = Renderable>,
) -> Result<Vec<Renderable>> {
    Ok(sort_checked(registry, checked(registry, resources)?))
}

pub(crate) fn sort_checked(registry: &Registry, mut resources: Vec<Renderable>) -> Vec<Renderable> {
    let ranks = registry.prepare();
    resources.sort_by_cached_key(|resource| {
        let library = resource.sort_library(registry);
        (
            resource.order(registry),
            ranks.library_nr(library),
            registry[library].name().to_string(),
            resource.dependency_nr(registry),
            resource.relpath(registry),
            resource.clone(),
        )
    });
    resources
}
