//! Resolve command implementation.

use std::io::{self, Write};

use modlayer_config::Manifest;
use modlayer_graph::GraphSnapshot;
use serde::Serialize;

use super::layers::{ResolvedLayer, RunOptions, TraceMode, resolve_layers, warn_empty_layers};
use crate::cli::ResolveArgs;
use crate::error::Result;
use crate::ui;

#[derive(Debug, Serialize)]
struct LayerOutput<'a> {
    layer: &'a str,
    graph: GraphSnapshot,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    trace: &'a [String],
}

/// Execute the resolve command.
///
/// Flags on the command line add to the manifest's `[settings]`; they never
/// turn a setting off.
pub fn execute(args: ResolveArgs, manifest: Manifest) -> Result<()> {
    let run = RunOptions {
        bind_services: args.bind || manifest.settings.bind_services,
        trace: if args.trace || manifest.settings.trace {
            TraceMode::Collect
        } else {
            TraceMode::Off
        },
    };
    let layers = resolve_layers(&manifest, run)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        write_json(&mut out, &layers)?;
    } else {
        write_text(&mut out, &layers)?;
    }
    out.flush()?;
    warn_empty_layers(&layers);

    let modules: usize = layers.iter().map(|l| l.configuration.len()).sum();
    ui::success(&format!(
        "resolved {} layer(s), {} module(s)",
        layers.len(),
        modules
    ));
    Ok(())
}

fn write_json(out: &mut impl Write, layers: &[ResolvedLayer]) -> Result<()> {
    let output: Vec<LayerOutput<'_>> = layers
        .iter()
        .map(|layer| LayerOutput {
            layer: &layer.name,
            graph: layer.configuration.snapshot(),
            trace: &layer.trace,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(())
}

/// One block per layer:
///
/// ```text
/// layer app
///   # root module app located
///   app -> base, sql
///   sql -> base
/// ```
fn write_text(out: &mut impl Write, layers: &[ResolvedLayer]) -> Result<()> {
    for layer in layers {
        let snapshot = layer.configuration.snapshot();
        match &snapshot.target_platform {
            Some(platform) => writeln!(out, "layer {} [{}]", layer.name, platform)?,
            None => writeln!(out, "layer {}", layer.name)?,
        }
        for line in &layer.trace {
            writeln!(out, "  # {line}")?;
        }
        for (module, reads) in &snapshot.modules {
            if reads.is_empty() {
                writeln!(out, "  {module}")?;
            } else {
                writeln!(out, "  {module} -> {}", reads.join(", "))?;
            }
        }
    }
    Ok(())
}
