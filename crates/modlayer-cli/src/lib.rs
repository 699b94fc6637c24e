//! modlayer CLI: resolve layered module manifests from the command line.
//!
//! - [`cli`] - argument parsing with clap
//! - [`commands`] - `resolve` and `check`
//! - [`error`] - `CliError`
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored status messages

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
