//! Command-line interface definition for modlayer.
//!
//! - `modlayer resolve` - resolve every layer and print the readability graphs
//! - `modlayer check` - resolve every layer and report success or failure

mod commands;

use clap::Parser;

pub use commands::{CheckArgs, Command, ResolveArgs};

/// modlayer - layered module resolution
#[derive(Parser, Debug)]
#[command(
    name = "modlayer",
    version,
    about = "Resolve layered module manifests into readability graphs"
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
