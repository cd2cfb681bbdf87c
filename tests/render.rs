//! End-to-end rendering against the fixture catalog in `fixtures/`.

use meta_tags::config::{self, MetaConfig};
use meta_tags::{Catalog, MetaError, MetaPath, MetaTags};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn setup() -> (MetaConfig, Catalog) {
    let config = config::load_config(&fixtures()).unwrap();
    let catalog = config.catalog(&fixtures()).unwrap();
    (config, catalog)
}

fn display(meta: &mut MetaTags, controller: &str, action: &str) -> Result<String, MetaError> {
    let (config, catalog) = setup();
    meta.display(
        &catalog,
        &MetaPath::for_action(controller, action),
        &config.layout.to_defaults(),
    )
    .map(|html| html.into_string())
}

#[test]
fn fixture_config_loads() {
    let (config, _) = setup();
    assert_eq!(config.layout.site, "Acme Store");
    assert_eq!(config.layout.separator, "|");
    assert_eq!(config.translations.files.len(), 2);
}

#[test]
fn most_specific_template_with_all_vars() {
    let mut meta = MetaTags::new();
    meta.add_var("name", "Chair");
    meta.add_var("category", "Seating");

    assert_eq!(
        display(&mut meta, "products", "show").unwrap(),
        "<title>Acme Store | Chair in Seating</title>\n\
         <meta name=\"keywords\" content=\"seating, furniture\">"
    );
}

#[test]
fn generic_template_when_name_is_unknown() {
    let mut meta = MetaTags::new();
    meta.add_var("category", "Lighting");

    let html = display(&mut meta, "products", "show").unwrap();
    assert!(html.starts_with("<title>Acme Store | Product</title>"));
}

#[test]
fn action_falls_back_to_controller_record() {
    let mut meta = MetaTags::new();
    meta.add_var("count", "42");

    assert_eq!(
        display(&mut meta, "products", "index").unwrap(),
        "<title>Acme Store | Products</title>\n\
         <meta name=\"description\" content=\"Browse all 42 products.\">"
    );
}

#[test]
fn unknown_controller_uses_merged_defaults() {
    let mut meta = MetaTags::new();
    let html = display(&mut meta, "pages", "about").unwrap();

    // en.local.toml overrides the title, en.toml still provides the rest.
    assert!(html.contains("<title>Acme Store | Home</title>"));
    assert!(html.contains("content=\"Acme Store sells furniture, lighting and decor.\""));
    assert!(html.contains("<meta name=\"keywords\" content=\"furniture, lighting, decor\">"));
}

#[test]
fn namespaced_controller_robots() {
    let mut meta = MetaTags::new();
    let html = display(&mut meta, "admin/orders", "index").unwrap();

    assert!(html.contains("<title>Acme Store | Orders</title>"));
    assert!(html.contains("<meta name=\"robots\" content=\"noindex, nofollow\">"));
    assert_eq!(html.matches("name=\"robots\"").count(), 1);
}

#[test]
fn explicit_tags_win_over_translations() {
    let mut meta = MetaTags::new();
    meta.title("Sale", None);
    meta.canonical("https://acme.example/sale");

    let html = display(&mut meta, "pages", "sale").unwrap();
    assert!(html.contains("<title>Acme Store | Sale</title>"));
    assert!(html.ends_with("<link rel=\"canonical\" href=\"https://acme.example/sale\">"));
}

#[test]
fn list_vars_expand_title_candidates() {
    let mut meta = MetaTags::new();
    meta.title("%{color} chair", None);
    meta.add_var("color", vec!["Red", "Blue"]);

    let html = display(&mut meta, "pages", "index").unwrap();
    assert!(html.contains("<title>Acme Store | Red chair | Blue chair</title>"));
}

#[test]
fn missing_variable_surfaces() {
    let mut meta = MetaTags::new();
    let err = display(&mut meta, "products", "index").unwrap_err();
    assert!(matches!(err, MetaError::MissingVariable { ref name, .. } if name == "count"));
}
