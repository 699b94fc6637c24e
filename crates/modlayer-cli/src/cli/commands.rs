use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

/// Available modlayer subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every layer and print each module's reads
    ///
    /// Layers resolve in manifest order, each on top of the previous one.
    Resolve(ResolveArgs),

    /// Resolve every layer and report only success or failure
    Check(CheckArgs),
}

impl Command {
    /// Manifest path given on the command line, if any.
    pub fn manifest(&self) -> Option<&Path> {
        match self {
            Self::Resolve(args) => args.manifest.as_deref(),
            Self::Check(args) => args.manifest.as_deref(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Resolve(_) => "resolve",
            Self::Check(_) => "check",
        }
    }
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Manifest file (defaults to ./modlayer.toml)
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Bind service providers after resolving each layer's roots
    #[arg(long)]
    pub bind: bool,

    /// Print resolver trace lines
    #[arg(long)]
    pub trace: bool,

    /// Print the graphs as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Manifest file (defaults to ./modlayer.toml)
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Bind service providers after resolving each layer's roots
    #[arg(long)]
    pub bind: bool,
}
