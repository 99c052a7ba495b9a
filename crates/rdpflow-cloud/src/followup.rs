//! Deferred follow-up tasks
//!
//! "Wait N seconds, then check again" work is scheduled on the runtime
//! timer and handed back as a [`FollowUpHandle`]. The caller stays free to
//! do other work, and can cancel the follow-up before it fires.

use std::future::Future;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

/// Scheduler for delayed follow-up work
pub struct FollowUp;

impl FollowUp {
    /// Run `task` once `delay` has elapsed
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut, T>(delay: Duration, task: F) -> FollowUpHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task().await
        });
        tracing::debug!("Scheduled follow-up in {:?}", delay);
        FollowUpHandle { handle }
    }
}

/// Handle to a scheduled follow-up
pub struct FollowUpHandle<T> {
    handle: JoinHandle<T>,
}

impl<T> FollowUpHandle<T> {
    /// Cancel the follow-up. Has no effect once it already ran.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Detached canceller, usable after the handle was moved into `join`
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the follow-up result; `None` if it was cancelled
    pub async fn join(self) -> Option<T> {
        match self.handle.await {
            Ok(value) => Some(value),
            Err(e) if e.is_cancelled() => None,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}
