//! Structural checks on a manifest, before any resolution runs.

use std::collections::HashSet;

use crate::error::{ConfigError, Result};
use crate::manifest::{Manifest, ModuleEntry};

pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.layers.is_empty() {
        return Err(ConfigError::NoLayers);
    }

    let mut layer_names = HashSet::new();
    for layer in &manifest.layers {
        if !layer_names.insert(layer.name.as_str()) {
            return Err(ConfigError::DuplicateLayer(layer.name.clone()));
        }
        if layer.roots.iter().any(|root| root.trim().is_empty()) {
            return Err(ConfigError::EmptyRoot {
                layer: layer.name.clone(),
            });
        }
        check_unique(&layer.name, "modules", &layer.modules)?;
        check_unique(&layer.name, "fallback", &layer.fallback)?;
    }
    Ok(())
}

fn check_unique(layer: &str, source_name: &'static str, entries: &[ModuleEntry]) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.descriptor.name()) {
            return Err(ConfigError::DuplicateModule {
                layer: layer.to_string(),
                module: entry.descriptor.name().to_string(),
                source_name,
            });
        }
    }
    Ok(())
}
