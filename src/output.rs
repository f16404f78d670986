//! # Output Configuration
//!
//! Controls how the CLI decorates its status lines. Colored output marks
//! results with styled labels; plain output uses bracketed tags so logs and
//! pipes stay readable.
//!
//! The following are respected, in order:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use std::env;

use console::style;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether styled output should be used.
    pub use_color: bool,
}

/// The kind of status line being printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Error,
    Info,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: "always", "never" or "auto".
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
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

    /// The label printed in front of a status line.
    pub fn label(&self, status: Status) -> String {
        let plain = match status {
            Status::Ok => "[OK]",
            Status::Warn => "[WARN]",
            Status::Error => "[ERR]",
            Status::Info => "[INFO]",
        };
        if !self.use_color {
            return plain.to_string();
        }
        let styled = match status {
            Status::Ok => style(plain).green().bold(),
            Status::Warn => style(plain).yellow().bold(),
            Status::Error => style(plain).red().bold(),
            Status::Info => style(plain).cyan(),
        };
        styled.force_styling(true).to_string()
    }

    /// Format a status line.
    pub fn line(&self, status: Status, message: impl AsRef<str>) -> String {
        format!("{} {}", self.label(status), message.as_ref())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
