//! Status messages on stderr.

use owo_colors::{OwoColorize, Style};

use super::color_enabled;

fn symbol(symbol: &str, style: Style) -> String {
    if color_enabled() {
        symbol.style(style).to_string()
    } else {
        symbol.to_string()
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", symbol("✓", Style::new().green().bold()), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", symbol("ℹ", Style::new().blue().bold()), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", symbol("⚠", Style::new().yellow().bold()), message);
}

/// Print an error message to stderr.
///
/// ```no_run
/// use modlayer_cli::ui::error;
///
/// error("layer app failed to resolve");
/// ```
pub fn error(message: &str) {
    eprintln!("{} {}", symbol("✗", Style::new().red().bold()), message);
}
