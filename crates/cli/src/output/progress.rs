//! Progress bar utilities for transfer operations
//!
//! Provides byte progress for downloads and uploads. The bar is drawn on
//! stderr and stays hidden when stderr is not a terminal.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use super::OutputConfig;

/// Progress bar wrapper
///
/// In quiet mode or with `--no-progress`, progress is suppressed.
#[derive(Debug, Clone)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a byte progress bar; `total` of `None` shows a running byte count
    pub fn new(config: &OutputConfig, total: Option<u64>, message: &str) -> Self {
        if config.quiet || config.no_progress || !console::Term::stderr().is_term() {
            return Self::hidden();
        }

        let bar = match total {
            Some(total) => {
                let bar = indicatif::ProgressBar::new(total);
                if let Ok(style) = indicatif::ProgressStyle::default_bar()
                    .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            None => {
                let bar = indicatif::ProgressBar::new_spinner();
                if let Ok(style) =
                    indicatif::ProgressStyle::default_spinner().template("{spinner} {msg} {bytes}")
                {
                    bar.set_style(style);
                }
                bar
            }
        };
        bar.set_message(message.to_string());

        Self { bar: Some(bar) }
    }

    /// A bar that never draws
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    /// Increment progress
    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    /// Finish and clear the progress bar
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Reader adapter that advances a progress bar as bytes pass through
#[derive(Debug)]
pub struct ProgressReader<R> {
    inner: R,
    bar: ProgressBar,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, bar: ProgressBar) -> Self {
        Self { inner, bar }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            self.bar.inc((buf.filled().len() - before) as u64);
        }
        poll
    }
}
