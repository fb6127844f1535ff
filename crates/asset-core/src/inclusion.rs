//! Inclusion pipeline
//!
//! An [`Inclusion`] turns what a [`NeededResources`] resolved into the list of
//! snippets to put in a page:
//!
//! ```text
//! resolve -> rollup -> mode -> sort -> bundle -> render
//! ```
//!
//! Rollup, mode selection and bundling are optional. [`TopBottom`] splits
//! the resolved set into a head and an end-of-body inclusion.

use crate::bundle::bundle_checked;
use crate::config::InclusionConfig;
use crate::graph::{DEBUG, MINIFIED};
use crate::needed::NeededResources;
use crate::registry::Registry;
use crate::renderable::{Renderable, checked};
use crate::rollup::rollup_checked;
use crate::sort::sort_checked;
use crate::{Error, Result};

/// Switches of the inclusion pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionOptions {
    /// Serve rollups in place of the resources they supersede.
    pub rollup: bool,
    /// Group adjacent compatible resources into bundles.
    pub bundle: bool,
    /// Serve every resource in this mode where it has one.
    pub mode: Option<String>,
}

impl TryFrom<&InclusionConfig> for InclusionOptions {
    type Error = Error;

    fn try_from(config: &InclusionConfig) -> Result<Self> {
        let mode = match (config.debug, config.minified) {
            (true, true) => {
                return Err(Error::configuration(
                    "Choose debug or minified, not both",
                ));
            }
            (true, false) => Some(DEBUG.to_string()),
            (false, true) => Some(MINIFIED.to_string()),
            (false, false) => None,
        };
        Ok(Self {
            rollup: config.rollup,
            bundle: config.bundle,
            mode,
        })
    }
}

/// Ordered renderables of one needed set, ready to render.
#[derive(Debug)]
pub struct Inclusion<'n> {
    needed: &'n NeededResources,
    resources: Vec<Renderable>,
}

impl<'n> Inclusion<'n> {
    /// Run the pipeline over everything `needed` resolves to.
    ///
    /// # Errors
    ///
    /// Returns `Error::Slot` when resolution fails.
    pub fn new(needed: &'n NeededResources, options: &InclusionOptions) -> Result<Self> {
        let resources = run(needed.registry(), needed.resolve()?, options);
        Ok(Self { needed, resources })
    }

    /// Run the pipeline over an explicit set of renderables.
    ///
    /// # Errors
    ///
    /// Returns an error when a renderable does not check out against the
    /// registry of `needed` (see [`Renderable::check`]).
    pub fn from_resources(
        needed: &'n NeededResources,
        resources: impl IntoIterator<Item = Renderable>,
        options: &InclusionOptions,
    ) -> Result<Self> {
        let registry = needed.registry();
        let resources = run(registry, checked(registry, resources)?, options);
        Ok(Self { needed, resources })
    }

    pub fn resources(&self) -> &[Renderable] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Render every item with its library URL, one per line.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fs` when a versioned library URL needs a signature
    /// that cannot be computed.
    pub fn render(&self) -> Result<String> {
        let registry = self.needed.registry();
        let lines = self
            .resources
            .iter()
            .map(|resource| {
                let url = self.needed.library_url(resource.library(registry))?;
                Ok(resource.render(registry, &url))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }
}

fn run(
    registry: &Registry,
    mut resources: Vec<Renderable>,
    options: &InclusionOptions,
) -> Vec<Renderable> {
    if options.rollup {
        resources = rollup_checked(registry, resources);
    }
    if let Some(mode) = &options.mode {
        resources = resources
            .iter()
            .map(|resource| resource.mode(registry, mode))
            .collect();
    }
    resources = sort_checked(registry, resources);
    if options.bundle {
        resources = bundle_checked(registry, resources);
    }
    resources
}

/// Split of resources between the page head and the end of the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopBottom {
    /// Move bottom-safe resources to the bottom.
    pub bottom: bool,
    /// With `bottom`, move every `.js` resource to the bottom instead.
    pub force_bottom: bool,
}

impl From<&InclusionConfig> for TopBottom {
    fn from(config: &InclusionConfig) -> Self {
        Self {
            bottom: config.bottom,
            force_bottom: config.force_bottom,
        }
    }
}

impl TopBottom {
    /// Build the top and bottom inclusions of `needed`.
    pub fn group<'n>(
        &self,
        needed: &'n NeededResources,
        options: &InclusionOptions,
    ) -> Result<(Inclusion<'n>, Inclusion<'n>)> {
        let registry = needed.registry();
        let resolved = needed.resolve()?;
        let (bottom, top): (Vec<Renderable>, Vec<Renderable>) = if !self.bottom {
            (Vec::new(), resolved)
        } else if self.force_bottom {
            resolved
                .into_iter()
                .partition(|resource| resource.ext(registry) == ".js")
        } else {
            resolved
                .into_iter()
                .partition(|resource| resource.bottom(registry))
        };
        Ok((
            Inclusion {
                needed,
                resources: run(registry, top, options),
            },
            Inclusion {
                needed,
                resources: run(registry, bottom, options),
            },
        ))
    }
}
