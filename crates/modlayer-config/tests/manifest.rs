//! Tests for manifest parsing, loading and conversion to finders.

use std::fs;
use std::sync::Arc;

use figment::Jail;
use modlayer_config::{ConfigError, Manifest, ManifestDiscovery, Settings};
use modlayer_graph::{Configuration, ContentHasher, ModuleKind};
use tempfile::TempDir;

const TWO_LAYERS: &str = r#"
[settings]
bind_services = true

[[layers]]
name = "boot"
roots = ["base"]

[[layers.modules]]
name = "base"
exports = [{ package = "base.lang" }, { package = "base.internal", targets = ["sql"] }]
location = "mem:base"

[[layers]]
name = "app"
roots = ["app"]

[[layers.modules]]
name = "app"
requires = [{ name = "sql" }, { name = "tools", static = true }]
uses = ["sql.spi.Driver"]

[[layers.fallback]]
name = "sql"
requires = [{ name = "base", transitive = true }]
exports = [{ package = "sql.spi" }]

[[layers.fallback]]
name = "legacy"
kind = "automatic"
packages = ["legacy.util"]
"#;

#[test]
fn parses_layers_and_entries() {
    let manifest = Manifest::from_toml_str(TWO_LAYERS).unwrap();

    assert!(manifest.settings.bind_services);
    assert!(manifest.settings.bootstrap_graph_exists);
    assert_eq!(manifest.layers.len(), 2);

    let boot = &manifest.layers[0];
    assert_eq!(boot.roots, vec!["base"]);
    let base = &boot.modules[0];
    assert_eq!(base.location.as_deref(), Some("mem:base"));
    assert!(base.descriptor.exports[1].is_exported_to("sql"));
    assert!(!base.descriptor.exports[1].is_exported_to("app"));

    let app = &manifest.layers[1].modules[0];
    assert!(app.descriptor.requires[1].is_static);
    let sql = &manifest.layers[1].fallback[0];
    assert!(sql.descriptor.requires[0].is_transitive);
    assert_eq!(manifest.layers[1].fallback[1].descriptor.kind, ModuleKind::Automatic);
}

#[test]
fn settings_default_when_omitted() {
    let manifest = Manifest::from_toml_str(
        r#"
[[layers]]
name = "only"
"#,
    )
    .unwrap();
    assert_eq!(manifest.settings, Settings::default());
    assert_eq!(manifest.settings.log_level, "warn");
}

#[test]
fn rejects_manifest_without_layers() {
    let err = Manifest::from_toml_str("[settings]\ntrace = true\n").unwrap_err();
    assert!(matches!(err, ConfigError::NoLayers));
}

#[test]
fn rejects_malformed_toml() {
    let err = Manifest::from_toml_str("[[layers]\nname = ").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue(_)));
}

#[test]
fn entries_normalize_exported_packages() {
    let manifest = Manifest::from_toml_str(TWO_LAYERS).unwrap();
    let reference = manifest.layers[0].modules[0].to_reference();
    assert!(reference.descriptor().packages.contains("base.lang"));
    assert!(reference.descriptor().packages.contains("base.internal"));
    assert_eq!(reference.location(), Some("mem:base"));
}

#[test]
fn automatic_entries_drop_declared_requires() {
    let source = r#"
[[layers]]
name = "app"
roots = ["app"]

[[layers.modules]]
name = "app"
requires = [{ name = "auto" }]

[[layers.modules]]
name = "auto"
kind = "automatic"
requires = [{ name = "ghost" }]
exports = [{ package = "auto.api" }]
uses = ["s.Service"]
packages = ["auto.impl"]
"#;
    let manifest = Manifest::from_toml_str(source).unwrap();
    let layer = &manifest.layers[0];

    let reference = layer.modules[1].to_reference();
    let descriptor = reference.descriptor();
    assert_eq!(descriptor.kind, ModuleKind::Automatic);
    assert!(descriptor.requires.is_empty());
    assert!(descriptor.exports.is_empty());
    assert!(descriptor.uses.is_empty());
    assert!(!descriptor.packages.contains("auto.api"));

    let configuration = Configuration::resolve(
        layer.before(),
        vec![],
        layer.after(),
        &layer.roots,
        manifest.settings.resolver_options(),
    )
    .unwrap();
    assert!(configuration.reads_module_named("app", "auto"));
    assert!(configuration.find_module("ghost").is_none());
}

#[test]
fn layers_resolve_on_top_of_each_other() {
    let manifest = Manifest::from_toml_str(TWO_LAYERS).unwrap();

    let mut parent = Configuration::empty();
    for layer in &manifest.layers {
        parent = Configuration::resolve(
            layer.before(),
            vec![Arc::clone(&parent)],
            layer.after(),
            &layer.roots,
            manifest.settings.resolver_options(),
        )
        .unwrap();
    }

    assert!(parent.reads_module_named("app", "sql"));
    assert!(parent.reads_module_named("app", "base"));
    assert!(parent.find_module("legacy").is_none());
}

#[test]
fn content_is_hashed() {
    let digest = ContentHasher::digest("SHA-256", b"lib bytes").unwrap();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    let source = format!(
        r#"
[[layers]]
name = "boot"
roots = ["app"]

[[layers.modules]]
name = "app"
requires = [{{ name = "lib" }}]
hashes = {{ algorithm = "SHA-256", hashes = {{ lib = "{hex}" }} }}

[[layers.modules]]
name = "lib"
content = "lib bytes"
"#
    );
    let manifest = Manifest::from_toml_str(&source).unwrap();
    let layer = &manifest.layers[0];

    let lib = layer.modules[1].to_reference();
    assert_eq!(lib.compute_hash("SHA-256"), Some(digest.clone()));
    assert_eq!(
        layer.modules[0].descriptor.hashes.as_ref().unwrap().hashes["lib"],
        digest
    );

    let configuration = Configuration::resolve(
        layer.before(),
        vec![],
        layer.after(),
        &layer.roots,
        manifest.settings.resolver_options(),
    );
    assert!(configuration.is_ok());
}

#[test]
fn discovery_loads_manifest_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("modlayer.toml"), TWO_LAYERS).unwrap();

    let discovery = ManifestDiscovery::new(dir.path());
    assert_eq!(
        discovery.find().unwrap().file_name().unwrap(),
        "modlayer.toml"
    );
    let manifest = discovery.load().unwrap();
    assert_eq!(manifest.layers[1].name, "app");
}

#[test]
fn load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Manifest::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn environment_overrides_settings() {
    Jail::expect_with(|jail| {
        jail.create_file("modlayer.toml", TWO_LAYERS)?;
        jail.set_env("MODLAYER_TRACE", "true");
        jail.set_env("MODLAYER_BOOTSTRAP_GRAPH_EXISTS", "false");

        let manifest =
            Manifest::load(std::path::Path::new("modlayer.toml")).map_err(|e| e.to_string())?;
        assert!(manifest.settings.trace);
        assert!(!manifest.settings.bootstrap_graph_exists);
        assert!(manifest.settings.bind_services);
        Ok(())
    });
}
