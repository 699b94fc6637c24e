//! Finding the manifest file on disk.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::manifest::Manifest;

/// Conventional manifest file name.
pub const MANIFEST_FILE: &str = "modlayer.toml";

/// Searches a directory for `modlayer.toml` and loads it.
///
/// # Example
///
/// ```no_run
/// use modlayer_config::ManifestDiscovery;
///
/// let manifest = ManifestDiscovery::new(".").load().unwrap();
/// ```
pub struct ManifestDiscovery {
    root: PathBuf,
}

impl ManifestDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(MANIFEST_FILE);
        path.is_file().then_some(path)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the directory has no manifest.
    pub fn load(&self) -> Result<Manifest> {
        let path = self
            .find()
            .ok_or_else(|| ConfigError::NotFound(self.root.join(MANIFEST_FILE)))?;
        Manifest::load(&path)
    }
}

/// Load `modlayer.toml` from the current directory.
pub fn discover() -> Result<Manifest> {
    let root = std::env::current_dir()?;
    ManifestDiscovery::new(root).load()
}
