//! Layer manifests and resolver settings for modlayer.
//!
//! A manifest lists resolver settings and an ordered stack of layers. Each
//! layer turns into a pair of module finders and a list of roots that
//! `modlayer-graph` resolves on top of the previous layer.

pub mod discovery;
pub mod error;
pub mod manifest;
pub mod settings;
pub mod validation;

pub use discovery::{MANIFEST_FILE, ManifestDiscovery, discover};
pub use error::{ConfigError, Result};
pub use manifest::{ENV_PREFIX, Layer, Manifest, ModuleEntry};
pub use settings::Settings;
