//! Diagnostic formatter
//!
//! Every failure path goes through here so that nothing is dropped silently.

use std::fmt::Display;

use console::style;

use super::OutputConfig;

/// Formatter for stderr diagnostics
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && console::colors_enabled_stderr()
    }

    /// Render the diagnostic line for a failed item
    pub fn item_error_line(&self, item: &str, context: &str, error: &dyn Display) -> String {
        if self.colors_enabled() {
            format!("[{}] {context}: {}", style(item).bold(), style(error).red())
        } else {
            format!("[{item}] {context}: {error}")
        }
    }

    /// Report the failure of one key or path
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn item_error(&self, item: &str, context: &str, error: &dyn Display) {
        eprintln!("{}", self.item_error_line(item, context, error));
    }

    /// Report a failure not tied to a single item
    pub fn error(&self, message: &str) {
        if self.colors_enabled() {
            eprintln!("{}", style(message).red());
        } else {
            eprintln!("{message}");
        }
    }

    /// Print a summary line such as `Deleted 3 object(s)`
    pub fn summary(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        eprintln!("{message}");
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
