//! One-time ranking of libraries and assets
//!
//! Sorting needs two numbers that can only be computed once the graph is
//! complete:
//!
//! - `library_nr`: 0 for a library without cross-library dependencies,
//!   otherwise one more than the highest rank of any library it depends on
//! - `dependency_nr`: 0 for an asset without same-library dependencies,
//!   otherwise one more than the highest rank of those dependencies
//!
//! [`Registry::prepare`] computes both under a lock, at most once. The
//! registry refuses further declarations afterwards.

use std::sync::PoisonError;

use crate::graph::{AssetId, Dependable, LibraryId, Node};
use crate::registry::Registry;

/// Ranks computed by [`Registry::prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranks {
    library_nr: Vec<u32>,
    dependency_nr: Vec<u32>,
}

impl Ranks {
    pub fn library_nr(&self, library: LibraryId) -> u32 {
        self.library_nr[library.index()]
    }

    /// Depth of `asset` within its own library. Groups rank 0.
    pub fn dependency_nr(&self, asset: AssetId) -> u32 {
        self.dependency_nr[asset.index()]
    }
}

impl Registry {
    /// Rank every library and asset.
    ///
    /// Safe to call from several threads; the first caller computes, every
    /// other call returns the same ranks.
    pub fn prepare(&self) -> &Ranks {
        if let Some(ranks) = self.ranks.get() {
            return ranks;
        }
        let _guard = self
            .prepare_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(ranks) = self.ranks.get() {
            return ranks;
        }

        let mut library_nr = vec![None; self.libraries.len()];
        for index in 0..self.libraries.len() {
            self.init_library_nr(LibraryId(index as u32), &mut library_nr);
        }
        let library_nr: Vec<u32> = library_nr.into_iter().map(|nr| nr.unwrap_or(0)).collect();

        let mut dependency_nr = vec![None; self.nodes.len()];
        for index in 0..self.nodes.len() {
            self.init_dependency_nr(AssetId(index as u32), &mut dependency_nr);
        }
        let dependency_nr = dependency_nr.into_iter().map(|nr| nr.unwrap_or(0)).collect();

        tracing::debug!(
            libraries = self.libraries.len(),
            assets = self.nodes.len(),
            "Prepared registry"
        );
        self.ranks.get_or_init(|| Ranks {
            library_nr,
            dependency_nr,
        })
    }

    pub fn is_prepared(&self) -> bool {
        self.ranks.get().is_some()
    }

    /// Rank of a library, once prepared.
    pub fn library_nr(&self, library: LibraryId) -> Option<u32> {
        self.ranks.get().map(|ranks| ranks.library_nr(library))
    }

    fn init_library_nr(&self, library: LibraryId, memo: &mut [Option<u32>]) -> u32 {
        if let Some(nr) = memo[library.index()] {
            return nr;
        }
        // Library dependencies are acyclic; the placeholder only guards
        // against unbounded recursion.
        memo[library.index()] = Some(0);

        let mut nr = 0;
        for &asset in &self[library].known_assets {
            for &dep in self[asset].depends() {
                for leaf in self.list_assets(dep) {
                    match self[leaf].library() {
                        Some(other) if other != library => {
                            nr = nr.max(self.init_library_nr(other, memo) + 1);
                        }
                        _ => {}
                    }
                }
            }
        }
        memo[library.index()] = Some(nr);
        nr
    }

    fn init_dependency_nr(&self, asset: AssetId, memo: &mut [Option<u32>]) -> u32 {
        if let Some(nr) = memo[asset.index()] {
            return nr;
        }
        let node = &self[asset];
        let nr = match node {
            Node::Group(_) => 0,
            _ => {
                let library = node.library();
                let mut nr = 0;
                for &dep in node.depends() {
                    for leaf in self.list_assets(dep) {
                        if self[leaf].library() == library {
                            nr = nr.max(self.init_dependency_nr(leaf, memo) + 1);
                        }
                    }
                }
                nr
            }
        };
        memo[asset.index()] = Some(nr);
        nr
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, Library, Registry, ResourceSpec};

    #[test]
    fn test_ranks_within_and_across_libraries() {
        let mut registry = Registry::new();
        let base = registry.add_library(Library::new("base", "")).unwrap();
        let app = registry.add_library(Library::new("app", "")).unwrap();

        let jquery = registry.add_resource(ResourceSpec::new(base, "jquery.js")).unwrap();
        let plugin = registry
            .add_resource(ResourceSpec::new(base, "plugin.js").depends([jquery]))
            .unwrap();
        let group = registry.add_group([plugin]).unwrap();
        let main = registry
            .add_resource(ResourceSpec::new(app, "main.js").depends([group]))
            .unwrap();
        let extra = registry
            .add_resource(ResourceSpec::new(app, "extra.js").depends([main]))
            .unwrap();

        let ranks = registry.prepare();
        assert_eq!(ranks.library_nr(base), 0);
        assert_eq!(ranks.library_nr(app), 1);
        assert_eq!(ranks.dependency_nr(jquery), 0);
        assert_eq!(ranks.dependency_nr(plugin), 1);
        // Cross-library dependencies do not count.
        assert_eq!(ranks.dependency_nr(main), 0);
        assert_eq!(ranks.dependency_nr(extra), 1);
    }

    #[test]
    fn test_prepare_is_idempotent_and_freezes() {
        let mut registry = Registry::new();
        let lib = registry.add_library(Library::new("lib", "")).unwrap();
        let a = registry.add_resource(ResourceSpec::new(lib, "a.js")).unwrap();

        assert!(!registry.is_prepared());
        assert_eq!(registry.library_nr(lib), None);
        let first = registry.prepare().clone();
        assert_eq!(&first, registry.prepare());
        assert_eq!(registry.library_nr(lib), Some(0));

        assert!(matches!(
            registry.add_resource(ResourceSpec::new(lib, "b.js")),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            registry.add_library(Library::new("other", "")),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            registry.add_group([a]),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_concurrent_prepare() {
        let mut registry = Registry::new();
        let lib = registry.add_library(Library::new("lib", "")).unwrap();
        let mut previous = registry.add_resource(ResourceSpec::new(lib, "0.js")).unwrap();
        for n in 1..50 {
            previous = registry
                .add_resource(ResourceSpec::new(lib, format!("{n}.js")).depends([previous]))
                .unwrap();
        }
        let registry = std::sync::Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.prepare().dependency_nr(previous))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 49);
        }
    }
}
