//! modlayer - entry point.
//!
//! Parses arguments, loads the manifest, sets up logging and colors, then
//! dispatches to the selected command.

use anyhow::Context as _;
use clap::Parser;
use modlayer_cli::{cli, commands, logger, ui};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    ui::init_colors(args.no_color);

    let manifest = commands::load_manifest(args.command.manifest());
    let level = manifest
        .as_ref()
        .map_or(logger::DEFAULT_LEVEL, |m| m.settings.log_level.as_str());
    logger::init_logger(args.verbose, args.quiet, args.no_color, level);

    let name = args.command.name();
    let result = manifest.and_then(|manifest| commands::execute(args.command, manifest));
    if let Err(err) = &result {
        ui::error(&err.to_string());
    }
    result.with_context(|| format!("modlayer {name} failed"))
}
