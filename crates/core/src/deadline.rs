//! Command deadlines
//!
//! A `Deadline` is handed to every storage operation. Dropping the wrapped
//! future when the deadline passes cancels the in-flight SDK request.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};

/// Absolute point in time by which an operation must finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    /// Child deadline that never outlives `self`
    pub fn narrow(&self, timeout: Duration) -> Self {
        Self {
            at: self.at.min(Instant::now() + timeout),
        }
    }

    /// Drive `fut` to completion or fail with [`Error::Timeout`] naming `what`
    pub async fn run<T, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(operation = what, "deadline exceeded");
                Err(Error::Timeout(what.to_string()))
            }
        }
    }
}
