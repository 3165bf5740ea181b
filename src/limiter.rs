use std::future::Future;
use std::sync::Arc;

use log::debug;
use tokio::sync::Semaphore;

use crate::error::{PushError, Result};

/// Caps the number of in-flight requests sharing one client.
///
/// Clones share the same slots. Waiting units are admitted first-come-first-served, since
/// tokio's semaphore is fair.
#[derive(Clone, Debug, Default)]
pub struct ConcurrencyLimiter {
    semaphore: Option<Arc<Semaphore>>,
}

impl ConcurrencyLimiter {
    /// `None` means no limit
    pub fn new(max_concurrent: Option<usize>) -> Result<Self> {
        match max_concurrent {
            None => Ok(ConcurrencyLimiter::unbounded()),
            Some(0) => Err(PushError::InvalidArgument(
                "max concurrent requests must be at least 1".to_string(),
            )),
            Some(max) => Ok(ConcurrencyLimiter {
                semaphore: Some(Arc::new(Semaphore::new(max))),
            }),
        }
    }

    pub fn unbounded() -> Self {
        ConcurrencyLimiter { semaphore: None }
    }

    /// Runs `task` once a slot is free and holds the slot until the task's future settles.
    ///
    /// The output of `task` is handed back untouched.
    pub async fn run<F, Fut, T>(&self, task: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _permit = match &self.semaphore {
            Some(semaphore) => {
                if semaphore.available_permits() == 0 {
                    debug!("limiter:: all slots busy, queueing");
                }
                // the semaphore is never closed
                semaphore.acquire().await.ok()
            }
            None => None,
        };
        task().await
    }
}
