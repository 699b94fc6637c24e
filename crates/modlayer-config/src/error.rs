//! Error types for manifest loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid manifest: {0}")]
    InvalidValue(String),

    // Structural validation
    #[error("manifest declares no layers")]
    NoLayers,

    #[error("layer {0} is declared more than once")]
    DuplicateLayer(String),

    #[error("layer {layer} lists module {module} more than once in {source_name}")]
    DuplicateModule {
        layer: String,
        module: String,
        source_name: &'static str,
    },

    #[error("layer {layer} has an empty root name")]
    EmptyRoot { layer: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::InvalidValue(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidValue(err.to_string())
    }
}
