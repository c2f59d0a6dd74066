//! # Console Output
//!
//! Decides whether console output uses color and emoji, and formats the
//! status lines the CLI prints.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! In CI logs (no TTY) output therefore stays plain unless forced, which
//! keeps the summary line easy to grep.

use console::style;
use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: `always` forces colors on
    /// (overriding `NO_COLOR`), `never` forces them off, anything else
    /// detects support from the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Kind of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
    Failure,
}

/// Formats a status line.
///
/// Plain output is the message unchanged; colored output gets an emoji
/// prefix and a color per status.
pub fn status_line(config: &OutputConfig, status: Status, message: &str) -> String {
    if !config.use_color {
        return message.to_string();
    }

    match status {
        Status::Success => format!("✅ {}", style(message).green()),
        Status::Warning => format!("⚠️  {}", style(message).yellow()),
        Status::Failure => format!("❌ {}", style(message).red().bold()),
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
