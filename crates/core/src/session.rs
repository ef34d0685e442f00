//! Lazily constructed, shared session handle
//!
//! The first caller through the lock that finds the slot empty builds the
//! handle; everyone after it gets a clone. A failed build leaves the slot
//! empty so a later call can try again.

use std::future::Future;

use tokio::sync::Mutex;

use crate::error::Result;

/// Memoized handle guarded by an async mutex
#[derive(Debug)]
pub struct SessionCell<T> {
    slot: Mutex<Option<T>>,
}

impl<T: Clone> SessionCell<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached handle, building it with `init` on first use
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(handle) = slot.as_ref() {
            return Ok(handle.clone());
        }

        let handle = init().await?;
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Whether a handle has been built
    pub async fn is_initialized(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

impl<T: Clone> Default for SessionCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_builds_once() {
        let cell = Arc::new(SessionCell::<usize>::new());
        let builds = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let builds = Arc::clone(&builds);
                tokio::spawn(async move {
                    cell.get_or_try_init(|| async {
                        // Widen the race window
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(builds.fetch_add(1, Ordering::SeqCst) + 100)
                    })
                    .await
                })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;
        for result in results {
            assert_eq!(result.unwrap().unwrap(), 100);
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cell = SessionCell::<String>::new();

        let first = cell
            .get_or_try_init(|| async { Err(Error::Config("bad region".into())) })
            .await;
        assert!(first.is_err());
        assert!(!cell.is_initialized().await);

        let second = cell
            .get_or_try_init(|| async { Ok("session".to_string()) })
            .await
            .unwrap();
        assert_eq!(second, "session");
        assert!(cell.is_initialized().await);

        // Cached value wins over a new initializer
        let third = cell
            .get_or_try_init(|| async { Ok("other".to_string()) })
            .await
            .unwrap();
        assert_eq!(third, "session");
    }
}
