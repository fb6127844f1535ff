//! Rollup consolidation
//!
//! A rollup is a resource declared to supersede a list of other resources,
//! typically a concatenation of them. When every superseded resource is
//! needed the rollup is served instead.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use crate::Result;
use crate::graph::AssetId;
use crate::registry::Registry;
use crate::renderable::{Renderable, checked};

/// Replace needed resources by rollups that supersede them.
///
/// A rollup is eligible when every resource it supersedes is present. A
/// resource with several eligible rollups is replaced by the one superseding
/// the most resources; equal sizes go to the rollup declared first. Only set
/// membership matters, so the result is independent of input order. It is
/// returned in [`Renderable`] order, ready for sorting.
///
/// # Errors
///
/// Returns an error when a renderable does not check out against `registry`
/// (see [`Renderable::check`]).
pub fn rollup_resources(
    registry: &Registry,
    resources: impl IntoIterator<Item = Renderable>,
) -> Result<Vec<Renderable>> {
    Ok(rollup_checked(registry, checked(registry, resources)?))
}

pub(crate) fn rollup_checked(registry: &Registry, resources: Vec<Renderable>) -> Vec<Renderable> {

    // rollup -> superseded resources that are present
    let mut present: HashMap<AssetId, BTreeSet<AssetId>> = HashMap::new();
    for resource in &resources {
        let Some(id) = underlying(resource) else {
            continue;
        };
        for &rollup in resource.rollups(registry) {
            present.entry(rollup).or_default().insert(id);
        }
    }

    let mut result = BTreeSet::new();
    for resource in resources {
        let eligible = resource
            .rollups(registry)
            .iter()
            .copied()
            .filter(|rollup| {
                let superseded = registry
                    .resource(*rollup)
                    .map_or(0, |rollup| rollup.supersedes().len());
                present.get(rollup).map_or(0, BTreeSet::len) == superseded
            })
            .max_by_key(|rollup| {
                let superseded = registry
                    .resource(*rollup)
                    .map_or(0, |rollup| rollup.supersedes().len());
                (superseded, Reverse(*rollup))
            });
        match eligible {
            Some(rollup) => {
                tracing::debug!(
                    resource = %resource.relpath(registry),
                    rollup = %registry.describe(rollup),
                    "Applied rollup"
                );
                result.insert(Renderable::Resource(rollup));
            }
            None => {
                result.insert(resource);
            }
        }
    }
    result.into_iter().collect()
}

/// The resource a renderable is served from, if it can be superseded.
fn underlying(resource: &Renderable) -> Option<AssetId> {
    match resource {
        Renderable::Resource(id) => Some(*id),
        Renderable::FilledSlot(filled) => Some(filled.filler()),
        Renderable::Bundle(_) => None,
    }
}
