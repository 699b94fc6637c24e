//! Layer manifests: the modules available to each layer and the roots it resolves.
//!
//! ```toml
//! [settings]
//! bind_services = true
//!
//! [[layers]]
//! name = "boot"
//! roots = ["base"]
//!
//! [[layers.modules]]
//! name = "base"
//! exports = [{ package = "base.lang" }]
//! content = "base module bytes"
//! ```
//!
//! Each layer resolves on top of the one before it. `modules` is searched
//! before the parent layers, `fallback` after them.

use std::path::Path;
use std::sync::Arc;

use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use modlayer_graph::{InMemoryFinder, ModuleDescriptor, ModuleFinder, ModuleReference};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::settings::Settings;

/// Prefix of environment variables overriding `[settings]`.
pub const ENV_PREFIX: &str = "MODLAYER_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,

    #[serde(default)]
    pub roots: Vec<String>,

    /// Searched before the parent layers.
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,

    /// Searched after the parent layers.
    #[serde(default)]
    pub fallback: Vec<ModuleEntry>,
}

/// A module descriptor plus how to locate and hash it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    #[serde(flatten)]
    pub descriptor: ModuleDescriptor,

    /// Module bytes; entries with content can be hash-verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ModuleEntry {
    pub fn new(descriptor: ModuleDescriptor) -> Self {
        Self {
            descriptor,
            content: None,
            location: None,
        }
    }

    pub fn to_reference(&self) -> ModuleReference {
        let mut reference = ModuleReference::new(self.descriptor.clone().normalized());
        if let Some(location) = &self.location {
            reference = reference.with_location(location.clone());
        }
        if let Some(content) = &self.content {
            reference = reference.with_content(content.as_bytes().to_vec());
        }
        reference
    }
}

impl Layer {
    /// Finder over `modules`.
    pub fn before(&self) -> Arc<dyn ModuleFinder> {
        Arc::new(finder_for(&self.modules))
    }

    /// Finder over `fallback`.
    pub fn after(&self) -> Arc<dyn ModuleFinder> {
        Arc::new(finder_for(&self.fallback))
    }
}

fn finder_for(entries: &[ModuleEntry]) -> InMemoryFinder {
    InMemoryFinder::new(entries.iter().map(ModuleEntry::to_reference))
}

impl Manifest {
    /// Load a manifest file.
    ///
    /// Priority: environment variables (`MODLAYER_BIND_SERVICES`, ...) > file > defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let manifest: Manifest = Figment::new()
            .merge(Serialized::defaults(Manifest::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| format!("settings.{key}").into()))
            .extract()?;

        tracing::debug!(
            path = %path.display(),
            layers = manifest.layers.len(),
            "manifest loaded"
        );
        manifest.validated()
    }

    /// Parse a manifest from TOML text, without environment overrides.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(source)?;
        manifest.validated()
    }

    fn validated(self) -> Result<Self> {
        crate::validation::validate(&self)?;
        Ok(self)
    }
}
