//! End-to-end integration test for a page render
//!
//! This test exercises the complete flow: config loading -> declaration
//! against a real library directory -> needing through the unit-of-work
//! context -> top/bottom inclusion with versioned URLs -> bundle lookup.

use std::fs;
use std::sync::Arc;

use asset_core::{
    AssetConfig, Error, InclusionOptions, Library, Registry, ResourceSpec, SlotSpec, TopBottom,
    context,
};
use asset_fs::{ContentHashSignature, SignatureMethod};
use asset_test_utils::tree::LibraryTree;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("assets.toml");
    fs::write(
        &path,
        r#"
[registry]
check_files = "yes"

[needed]
versioning = true
versioning_use_md5 = "true"
base_url = "http://cdn.example.com"

[inclusion]
bundle = true
bottom = "on"
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_full_page_render() {
    let config_dir = TempDir::new().unwrap();
    let config = AssetConfig::load(write_config(&config_dir)).unwrap();

    let tree = LibraryTree::sample();
    tree.write("js/plugin.js", "jQuery.fn.plugin = function () {};");
    tree.assert_file_exists("js/plugin.js");

    let mut registry = Registry::with_options(config.registry.clone());
    let lib = registry
        .add_library(Library::new("sample", tree.root()).with_ignores(["*.psd"]))
        .unwrap();
    let style = registry.add_resource(ResourceSpec::new(lib, "style.css")).unwrap();
    let theme = registry
        .add_slot(SlotSpec::new(lib, ".css").default(style))
        .unwrap();
    let jquery = registry.add_resource(ResourceSpec::new(lib, "js/jquery.js")).unwrap();
    let app = registry
        .add_resource(
            ResourceSpec::new(lib, "js/app.js")
                .depends([jquery, theme])
                .bottom(true),
        )
        .unwrap();
    let plugin = registry
        .add_resource(ResourceSpec::new(lib, "js/plugin.js").depends([jquery]).bottom(true))
        .unwrap();

    // Declaring a file that is not there fails with file checking on.
    assert!(matches!(
        registry.add_resource(ResourceSpec::new(lib, "js/missing.js")),
        Err(Error::UnknownResource { .. })
    ));
    assert!(registry[lib].is_ignored("/art/logo.psd"));

    let registry = Arc::new(registry);
    let options = InclusionOptions::try_from(&config.inclusion).unwrap();
    let top_bottom = TopBottom::from(&config.inclusion);

    let (top, bottom) = {
        let _guard = context::init_needed(registry.clone(), config.needed.clone());
        context::need(app).unwrap();
        context::need(plugin).unwrap();

        context::with_needed(|needed| {
            let (top, bottom) = top_bottom.group(needed, &options)?;
            Ok::<_, Error>((top.render()?, bottom.render()?))
        })
        .unwrap()
        .unwrap()
    };
    assert!(!context::has_needed());

    let signature = ContentHashSignature.compute(tree.root()).unwrap();
    let url = format!("http://cdn.example.com/assets/sample/:version:{signature}");
    assert_eq!(
        top,
        format!(
            "<link rel=\"stylesheet\" type=\"text/css\" href=\"{url}/style.css\" />\n\
             <script type=\"text/javascript\" src=\"{url}/js/jquery.js\"></script>"
        )
    );
    assert_eq!(
        bottom,
        format!(
            "<script type=\"text/javascript\" src=\"{url}/js/:bundle:app.js;plugin.js\"></script>"
        )
    );

    // The bundle URL resolves back to the resources it was built from.
    assert_eq!(
        registry
            .resolve_bundle(lib, "/js/:bundle:app.js;plugin.js")
            .unwrap(),
        vec![app, plugin]
    );

    // Outside a unit of work needing is silently dropped.
    context::need(app).unwrap();
    assert!(!context::has_needed());
}

#[test]
fn test_rollups_and_modes_from_config() {
    let config = AssetConfig::from_toml_str(
        r#"
[needed]
publisher_signature = ""
script_name = "/app"

[inclusion]
rollup = "y"
minified = "1"
"#,
    )
    .unwrap();

    let mut registry = Registry::new();
    let lib = registry.add_library(Library::new("widgets", "")).unwrap();
    let a = registry
        .add_resource(ResourceSpec::new(lib, "a.js").minified("a.min.js"))
        .unwrap();
    let b = registry
        .add_resource(ResourceSpec::new(lib, "b.js").minified("b.min.js"))
        .unwrap();
    let both = registry
        .add_resource(
            ResourceSpec::new(lib, "both.js")
                .supersedes([a, b])
                .minified("both.min.js"),
        )
        .unwrap();
    let registry = Arc::new(registry);

    let _guard = context::init_needed(registry.clone(), config.needed.clone());
    context::need(a).unwrap();
    let options = InclusionOptions::try_from(&config.inclusion).unwrap();

    let render = || {
        context::with_needed(|needed| {
            asset_core::Inclusion::new(needed, &options)
                .and_then(|inclusion| inclusion.render())
        })
        .unwrap()
        .unwrap()
    };
    assert_eq!(
        render(),
        "<script type=\"text/javascript\" src=\"/app/widgets/a.min.js\"></script>"
    );

    context::need(b).unwrap();
    assert_eq!(
        render(),
        "<script type=\"text/javascript\" src=\"/app/widgets/both.min.js\"></script>"
    );
    assert_eq!(registry.mode(both, asset_core::MINIFIED), registry[lib].known_resource("both.min.js").unwrap());
}
