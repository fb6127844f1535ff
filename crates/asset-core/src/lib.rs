//! Core of the static asset manager
//!
//! This crate lets a host declare its static assets once and then, per
//! request, ask for the ones a page needs:
//!
//! - **Asset graph**: libraries, resources, slots and groups in a
//!   [`Registry`], with dependency closures kept up to date on declaration
//! - **Preparation**: one-time ranking of libraries and assets for sorting
//! - **Needed sets**: per-request [`NeededResources`] that resolve the
//!   dependency closure and fill slots
//! - **Inclusion**: rollup, mode selection, deterministic sorting, bundling
//!   and rendering of the resolved set
//!
//! # Architecture
//!
//! `asset-core` sits on top of `asset-fs`, which lists library directories
//! and computes their signatures:
//!
//! ```text
//!        host application
//!               |
//!          asset-core
//!               |
//!           asset-fs
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use asset_core::{
//!     Inclusion, InclusionOptions, Library, NeededConfig, NeededResources, Registry, ResourceSpec,
//! };
//!
//! let mut registry = Registry::new();
//! let lib = registry.add_library(Library::new("jquery", "/srv/jquery")).unwrap();
//! let jquery = registry.add_resource(ResourceSpec::new(lib, "jquery.js")).unwrap();
//! let ui = registry
//!     .add_resource(ResourceSpec::new(lib, "jquery-ui.js").depends([jquery]))
//!     .unwrap();
//!
//! let mut needed = NeededResources::new(Arc::new(registry), NeededConfig::default());
//! needed.need(ui).unwrap();
//!
//! let inclusion = Inclusion::new(&needed, &InclusionOptions::default()).unwrap();
//! assert_eq!(
//!     inclusion.render().unwrap(),
//!     "<script type=\"text/javascript\" src=\"/assets/jquery/jquery.js\"></script>\n\
//!      <script type=\"text/javascript\" src=\"/assets/jquery/jquery-ui.js\"></script>"
//! );
//! ```

pub mod bundle;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod inclusion;
pub mod library;
pub mod logging;
pub mod needed;
pub mod prepare;
pub mod registry;
pub mod renderable;
pub mod renderer;
pub mod rollup;
pub mod sort;

pub use bundle::{BUNDLE_PREFIX, bundle_resources};
pub use config::{
    AssetConfig, DEFAULT_PUBLISHER_SIGNATURE, InclusionConfig, NeededConfig, RegistryOptions,
    parse_bool,
};
pub use error::{Error, Result};
pub use graph::{AssetId, DEBUG, Dependable, Group, LibraryId, MINIFIED, Node, Resource, Slot};
pub use inclusion::{Inclusion, InclusionOptions, TopBottom};
pub use library::{Library, VERSION_PREFIX};
pub use needed::NeededResources;
pub use prepare::Ranks;
pub use registry::{ModeSpec, Registry, ResourceSpec, SlotSpec};
pub use renderable::{Bundle, FilledSlot, Renderable};
pub use renderer::{Renderer, RendererRegistry};
pub use rollup::rollup_resources;
pub use sort::sort_resources;

pub use asset_fs::{ContentHashSignature, MtimeSignature, SignatureKind, SignatureMethod};
