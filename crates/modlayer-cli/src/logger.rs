//! Logging setup for the modlayer CLI.
//!
//! Log lines go to stderr so that `resolve --json` output on stdout stays
//! machine readable.
//!
//! The filter is chosen in this order:
//! 1. `--verbose`: debug for the modlayer crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. the manifest's `log_level` setting

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Level used when no manifest could be loaded.
pub const DEFAULT_LEVEL: &str = "warn";

const CRATES: [&str; 4] = ["modlayer", "modlayer_graph", "modlayer_config", "modlayer_cli"];

/// Install the global tracing subscriber. Call once, early in `main`.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool, level: &str) {
    let filter = if verbose {
        crate_filter("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| crate_filter(level))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Directives enabling `level` for every modlayer crate.
///
/// `modlayer` also covers the `modlayer::trace` target of resolver traces.
pub fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(directives(level)).unwrap_or_else(|_| EnvFilter::new(directives(DEFAULT_LEVEL)))
}
