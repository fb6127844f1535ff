//! Inclusion renderers
//!
//! A renderer turns the URL of a resource into the HTML snippet that includes
//! it in a page. Renderers are registered per filename extension together with
//! an order: resources with a lower order are included earlier in the page.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Function signature of a renderer.
pub type RenderFn = dyn Fn(&str) -> String + Send + Sync;

/// A named function from URL to HTML snippet.
///
/// Two renderers are the same renderer when their names are equal; the
/// bundler relies on this to decide which resources may share a bundle.
#[derive(Clone)]
pub struct Renderer {
    name: String,
    render: Arc<RenderFn>,
}

impl Renderer {
    /// Create a renderer from a name and a rendering function.
    pub fn new(
        name: impl Into<String>,
        render: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            render: Arc::new(render),
        }
    }

    /// `<link rel="stylesheet">`
    pub fn css() -> Self {
        Self::new("css", render_css)
    }

    /// `<script>`
    pub fn js() -> Self {
        Self::new("js", render_js)
    }

    /// `<link rel="shortcut icon">`
    pub fn ico() -> Self {
        Self::new("ico", render_ico)
    }

    /// Stylesheet limited to print media.
    pub fn print_css() -> Self {
        Self::new("print_css", render_print_css)
    }

    /// Stylesheet limited to screen media.
    pub fn screen_css() -> Self {
        Self::new("screen_css", render_screen_css)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the snippet for `url`.
    pub fn render(&self, url: &str) -> String {
        (self.render)(url)
    }
}

impl PartialEq for Renderer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Renderer {}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Renderer").field(&self.name).finish()
    }
}

pub fn render_css(url: &str) -> String {
    format!(r#"<link rel="stylesheet" type="text/css" href="{url}" />"#)
}

pub fn render_js(url: &str) -> String {
    format!(r#"<script type="text/javascript" src="{url}"></script>"#)
}

pub fn render_ico(url: &str) -> String {
    format!(r#"<link rel="shortcut icon" type="image/x-icon" href="{url}"/>"#)
}

pub fn render_print_css(url: &str) -> String {
    format!(r#"<link rel="stylesheet" type="text/css" href="{url}" media="print" />"#)
}

pub fn render_screen_css(url: &str) -> String {
    format!(r#"<link rel="stylesheet" type="text/css" media="screen" href="{url}" />"#)
}

/// Extension to `(order, renderer)` table.
#[derive(Debug, Clone)]
pub struct RendererRegistry {
    entries: HashMap<String, (usize, Renderer)>,
    default_order: usize,
}

impl Default for RendererRegistry {
    /// Registers `.css` (10), `.js` (20) and `.ico` (30).
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(".css", Renderer::css(), Some(10));
        registry.register(".js", Renderer::js(), Some(20));
        registry.register(".ico", Renderer::ico(), Some(30));
        registry
    }
}

impl RendererRegistry {
    /// Create a registry without any renderer.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            default_order: 0,
        }
    }

    /// Register `renderer` for `extension` (including the leading dot).
    ///
    /// Without an explicit `order` the renderer is placed after every
    /// renderer registered with an order so far. An existing registration
    /// for the extension is replaced.
    pub fn register(&mut self, extension: impl Into<String>, renderer: Renderer, order: Option<usize>) {
        let order = match order {
            Some(order) => {
                self.default_order = self.default_order.max(order.saturating_add(1));
                order
            }
            None => self.default_order,
        };
        self.entries.insert(extension.into(), (order, renderer));
    }

    /// Look up the order and renderer for `extension`.
    pub fn get(&self, extension: &str) -> Option<(usize, &Renderer)> {
        self.entries
            .get(extension)
            .map(|(order, renderer)| (*order, renderer))
    }

    /// Look up only the order for `extension`.
    pub fn order_of(&self, extension: &str) -> Option<usize> {
        self.entries.get(extension).map(|(order, _)| *order)
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.entries.contains_key(extension)
    }

    /// The order given to the next registration without an explicit order.
    pub fn default_order(&self) -> usize {
        self.default_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_ordered_css_js_ico() {
        let registry = RendererRegistry::default();
        assert_eq!(registry.order_of(".css"), Some(10));
        assert_eq!(registry.order_of(".js"), Some(20));
        assert_eq!(registry.order_of(".ico"), Some(30));
        assert_eq!(registry.default_order(), 31);
    }

    #[test]
    fn registration_without_order_goes_last() {
        let mut registry = RendererRegistry::default();
        registry.register(".tpl", Renderer::new("tpl", |url| format!("<tpl {url}>")), None);
        assert_eq!(registry.order_of(".tpl"), Some(31));

        registry.register(".early", Renderer::new("early", |url| url.to_string()), Some(5));
        assert_eq!(registry.order_of(".early"), Some(5));
        assert_eq!(registry.default_order(), 31);

        registry.register(".late", Renderer::new("late", |url| url.to_string()), Some(40));
        registry.register(".after", Renderer::new("after", |url| url.to_string()), None);
        assert_eq!(registry.order_of(".after"), Some(41));
    }

    #[test]
    fn renderers_produce_snippets() {
        assert_eq!(
            Renderer::js().render("/lib/a.js"),
            r#"<script type="text/javascript" src="/lib/a.js"></script>"#
        );
        assert_eq!(
            Renderer::css().render("/lib/a.css"),
            r#"<link rel="stylesheet" type="text/css" href="/lib/a.css" />"#
        );
        assert_eq!(
            Renderer::print_css().render("/p.css"),
            r#"<link rel="stylesheet" type="text/css" href="/p.css" media="print" />"#
        );
        assert_eq!(
            Renderer::screen_css().render("/s.css"),
            r#"<link rel="stylesheet" type="text/css" media="screen" href="/s.css" />"#
        );
        assert_eq!(
            Renderer::ico().render("/favicon.ico"),
            r#"<link rel="shortcut icon" type="image/x-icon" href="/favicon.ico"/>"#
        );
    }

    #[test]
    fn renderer_identity_is_by_name() {
        assert_eq!(Renderer::js(), Renderer::new("js", |_| String::new()));
        assert_ne!(Renderer::js(), Renderer::css());
    }
}
