//! Output formatting and progress indicators
//!
//! Status lines, spinners and error display for `jnbuild`. Everything here
//! respects `--quiet`; errors are always shown.

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Where user-facing messages go
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    quiet: bool,
}

impl Output {
    /// Create an output honouring `quiet`
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Plain line
    pub fn line(self, message: impl Display) {
        if !self.quiet {
            println!("{message}");
        }
    }

    /// Success line
    pub fn success(self, message: impl Display) {
        self.line(format_args!("{} {message}", status::SUCCESS));
    }

    /// Informational line
    pub fn info(self, message: impl Display) {
        self.line(format_args!("{} {message}", status::INFO));
    }

    /// Spinner, hidden when quiet
    pub fn spinner(self, message: &str) -> ProgressBar {
        if self.quiet {
            ProgressBar::hidden()
        } else {
            create_spinner(message)
        }
    }
}

/// Print an error with its full cause chain
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Default log filter for the verbosity flags
pub fn log_level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}
