//! Resolving a manifest's layers in order, each on top of the previous one.

use std::path::Path;
use std::sync::Arc;

use modlayer_config::{Manifest, discover};
use modlayer_graph::{Configuration, Resolver, ResolverOptions, TraceLog, TracingSink};

use crate::error::{CliError, Result};
use crate::ui;

/// Where resolver trace lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceMode {
    /// No sink; trace lines are never formatted.
    #[default]
    Off,
    /// Keep the lines on each [`ResolvedLayer`].
    Collect,
    /// Forward the lines to `tracing` under `modlayer::trace`.
    Log,
}

/// How to run the resolver for every layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub bind_services: bool,
    pub trace: TraceMode,
}

/// One successfully resolved layer.
#[derive(Debug)]
pub struct ResolvedLayer {
    pub name: String,
    pub configuration: Arc<Configuration>,
    pub trace: Vec<String>,
}

/// Load the manifest at `path`, or discover `modlayer.toml` in the current directory.
pub fn load_manifest(path: Option<&Path>) -> Result<Manifest> {
    let manifest = match path {
        Some(path) => Manifest::load(path)?,
        None => discover()?,
    };
    Ok(manifest)
}

/// Resolve every layer. Stops at the first layer that fails.
pub fn resolve_layers(manifest: &Manifest, run: RunOptions) -> Result<Vec<ResolvedLayer>> {
    let mut resolved: Vec<ResolvedLayer> = Vec::with_capacity(manifest.layers.len());
    let mut parent = Configuration::empty();

    for layer in &manifest.layers {
        let _span = tracing::info_span!("layer", name = %layer.name).entered();

        let log = TraceLog::new();
        let options: ResolverOptions = match run.trace {
            TraceMode::Off => manifest.settings.resolver_options(),
            TraceMode::Collect => manifest.settings.resolver_options().trace(log.clone()),
            TraceMode::Log => manifest.settings.resolver_options().trace(TracingSink),
        };

        let configuration = resolve_one(
            Resolver::new(layer.before(), vec![Arc::clone(&parent)], layer.after(), options),
            &layer.roots,
            run.bind_services,
        )
        .map_err(|err| CliError::resolve(&layer.name, err))?;

        let configuration = Arc::new(configuration);
        tracing::info!(modules = configuration.len(), "layer resolved");
        parent = Arc::clone(&configuration);
        resolved.push(ResolvedLayer {
            name: layer.name.clone(),
            configuration,
            trace: log.lines(),
        });
    }

    Ok(resolved)
}

/// Warn about layers whose roots were all satisfied by earlier layers.
pub fn warn_empty_layers(layers: &[ResolvedLayer]) {
    for layer in layers.iter().filter(|layer| layer.configuration.is_empty()) {
        ui::warning(&format!("layer {} selects no modules", layer.name));
    }
}

fn resolve_one(
    resolver: modlayer_graph::Result<Resolver>,
    roots: &[String],
    bind_services: bool,
) -> modlayer_graph::Result<Configuration> {
    let mut resolver = resolver?;
    resolver.resolve(roots)?;
    if bind_services {
        let bound = resolver.bind_services()?;
        tracing::debug!(providers = bound.len(), "services bound");
    }
    resolver.finish()
}
