//! Check command implementation.
//!
//! Resolves every layer without printing graphs.

use modlayer_config::Manifest;

use super::layers::{RunOptions, TraceMode, resolve_layers, warn_empty_layers};
use crate::cli::CheckArgs;
use crate::error::Result;
use crate::ui;

pub fn execute(args: CheckArgs, manifest: Manifest) -> Result<()> {
    let run = RunOptions {
        bind_services: args.bind || manifest.settings.bind_services,
        trace: if manifest.settings.trace {
            TraceMode::Log
        } else {
            TraceMode::Off
        },
    };

    ui::info(&format!("checking {} layer(s)...", manifest.layers.len()));
    let layers = resolve_layers(&manifest, run)?;
    for layer in &layers {
        ui::success(&format!(
            "layer {}: {} module(s)",
            layer.name,
            layer.configuration.len()
        ));
    }
    warn_empty_layers(&layers);
    ui::success("all layers resolve");
    Ok(())
}
