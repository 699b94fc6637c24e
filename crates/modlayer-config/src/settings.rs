//! Resolver settings shared by every layer of a manifest.

use modlayer_graph::ResolverOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Run service binding after resolving the roots of each layer.
    #[serde(default)]
    pub bind_services: bool,

    /// Emit resolver trace lines.
    #[serde(default)]
    pub trace: bool,

    #[serde(default = "default_bootstrap_graph_exists")]
    pub bootstrap_graph_exists: bool,

    /// Log filter used when neither `--verbose` nor `--quiet` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bootstrap_graph_exists() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_services: false,
            trace: false,
            bootstrap_graph_exists: default_bootstrap_graph_exists(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Resolver options for one layer. Tracing sinks are attached by the caller.
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions::new().bootstrap_graph_exists(self.bootstrap_graph_exists)
    }
}
