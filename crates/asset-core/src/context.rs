//! Needed set of the current unit of work
//!
//! Code deep inside a request handler often wants to need an asset without a
//! needed set being passed down to it. The host installs one per unit of work
//! with [`init_needed`]; everything running on that thread can then call
//! [`need`]. Without an installed set, `need` does nothing.
//!
//! ```
//! use std::sync::Arc;
//! use asset_core::{context, Library, NeededConfig, Registry, ResourceSpec};
//!
//! let mut registry = Registry::new();
//! let lib = registry.add_library(Library::new("lib", "")).unwrap();
//! let app = registry.add_resource(ResourceSpec::new(lib, "app.js")).unwrap();
//! let registry = Arc::new(registry);
//!
//! {
//!     let _guard = context::init_needed(registry.clone(), NeededConfig::default());
//!     context::need(app).unwrap();
//!     assert_eq!(context::with_needed(|needed| needed.has_resources()), Some(true));
//! }
//! assert!(!context::has_needed());
//! ```
//!
//! The set lives in a thread local. A unit of work that skips teardown leaks
//! its set into the next one scheduled on the same thread.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::Result;
use crate::config::NeededConfig;
use crate::graph::AssetId;
use crate::needed::NeededResources;
use crate::registry::Registry;

thread_local! {
    static NEEDED: RefCell<Option<NeededResources>> = const { RefCell::new(None) };
}

/// Removes the installed needed set when dropped.
///
/// Not `Send`: it must be dropped on the thread that installed the set.
#[must_use = "dropping the guard removes the needed set immediately"]
#[derive(Debug)]
pub struct NeededGuard {
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for NeededGuard {
    fn drop(&mut self) {
        del_needed();
    }
}

/// Install a fresh needed set for the current thread, replacing any
/// previous one.
pub fn init_needed(registry: Arc<Registry>, config: NeededConfig) -> NeededGuard {
    let needed = NeededResources::new(registry, config);
    let replaced = NEEDED.with(|slot| slot.borrow_mut().replace(needed));
    if replaced.is_some() {
        tracing::warn!("Replaced a needed set that was never torn down");
    }
    NeededGuard {
        _thread_bound: PhantomData,
    }
}

/// Remove the needed set of the current thread, if any.
pub fn del_needed() {
    NEEDED.with(|slot| slot.borrow_mut().take());
}

pub fn has_needed() -> bool {
    NEEDED.with(|slot| slot.borrow().is_some())
}

/// Need `asset` in the installed set. A no-op without one.
pub fn need(asset: AssetId) -> Result<()> {
    need_with_slots(asset, std::iter::empty())
}

/// Need `asset` with slot bindings in the installed set. A no-op without one.
pub fn need_with_slots(
    asset: AssetId,
    slots: impl IntoIterator<Item = (AssetId, AssetId)>,
) -> Result<()> {
    with_needed(|needed| needed.need_with_slots(asset, slots)).unwrap_or(Ok(()))
}

/// Forget what the installed set needs so far.
pub fn clear_needed() {
    with_needed(NeededResources::clear);
}

/// Run `f` with the installed set, or return `None` without one.
///
/// # Panics
///
/// Panics if `f` calls back into this module.
pub fn with_needed<R>(f: impl FnOnce(&mut NeededResources) -> R) -> Option<R> {
    NEEDED.with(|slot| slot.borrow_mut().as_mut().map(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Library, ResourceSpec};

    fn registry() -> (Arc<Registry>, AssetId) {
        let mut registry = Registry::new();
        let lib = registry.add_library(Library::new("lib", "")).unwrap();
        let a = registry.add_resource(ResourceSpec::new(lib, "a.js")).unwrap();
        (Arc::new(registry), a)
    }

    #[test]
    fn test_need_without_installed_set_is_noop() {
        let (_, a) = registry();
        assert!(!has_needed());
        need(a).unwrap();
        clear_needed();
        assert_eq!(with_needed(|needed| needed.has_resources()), None);
    }

    #[test]
    fn test_guard_tears_down() {
        let (registry, a) = registry();
        let guard = init_needed(registry, NeededConfig::default());
        need(a).unwrap();
        assert_eq!(
            with_needed(|needed| needed.needed().iter().copied().collect::<Vec<_>>()),
            Some(vec![a])
        );
        drop(guard);
        assert!(!has_needed());
    }

    #[test]
    fn test_explicit_teardown_and_clear() {
        let (registry, a) = registry();
        let _guard = init_needed(registry, NeededConfig::default());
        need(a).unwrap();
        clear_needed();
        assert_eq!(with_needed(|needed| needed.has_resources()), Some(false));
        del_needed();
        assert!(!has_needed());
    }

    #[test]
    fn test_sets_are_per_thread() {
        let (registry, a) = registry();
        let _guard = init_needed(registry, NeededConfig::default());
        need(a).unwrap();

        std::thread::spawn(|| {
            assert!(!has_needed());
        })
        .join()
        .unwrap();
        assert!(has_needed());
    }
}
