//! Command implementations for the modlayer CLI.
//!
//! - [`resolve`] - print the readability graph of every layer
//! - [`check`] - validate that every layer resolves

pub mod check;
pub mod layers;
pub mod resolve;

use modlayer_config::Manifest;

use crate::cli::Command;
use crate::error::Result;

pub use check::execute as check_execute;
pub use layers::{
    ResolvedLayer, RunOptions, TraceMode, load_manifest, resolve_layers, warn_empty_layers,
};
pub use resolve::execute as resolve_execute;

/// Run `command` against an already loaded manifest.
pub fn execute(command: Command, manifest: Manifest) -> Result<()> {
    match command {
        Command::Resolve(args) => resolve_execute(args, manifest),
        Command::Check(args) => check_execute(args, manifest),
    }
}
