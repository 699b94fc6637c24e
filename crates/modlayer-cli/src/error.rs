//! Error types for the modlayer CLI.
//!
//! `CliError` wraps manifest and resolution failures. The binary reports it
//! through `anyhow`, which prints the full source chain.

use modlayer_config::ConfigError;
use modlayer_graph::ResolveError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A layer failed to resolve; earlier layers succeeded.
    #[error("failed to resolve layer {layer}")]
    Resolve {
        layer: String,
        #[source]
        source: ResolveError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn resolve(layer: impl Into<String>, source: ResolveError) -> Self {
        Self::Resolve {
            layer: layer.into(),
            source,
        }
    }
}
