//! Output formatting utilities
//!
//! Data (listed keys, object bytes) goes to stdout; diagnostics, summaries
//! and progress go to stderr.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::{ProgressBar, ProgressReader};

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress bar
    pub no_progress: bool,
    /// Suppress summaries and progress; errors are always printed
    pub quiet: bool,
}
