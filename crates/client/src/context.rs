//! Cancellation context threaded through every call.
//!
//! A [`Context`] ends either when its [`CancelHandle`] fires or when its
//! deadline passes. Deadlines use [`tokio::time::Instant`], so tests running
//! on a paused clock observe them deterministically.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The cancel handle fired.
    Cancelled,
    /// The deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "context canceled"),
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

/// Caller-owned cancellation scope. Cheap to clone; clones share the signal.
#[derive(Debug, Clone)]
pub struct Context {
    cancel: watch::Receiver<bool>,
    deadline: Option<Instant>,
    /// Keeps the sender alive for as long as any context clone exists.
    keepalive: Option<Arc<watch::Sender<bool>>>,
}

/// Fires the cancellation of the context it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancel the context and every clone or child of it.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that never ends on its own.
    pub fn background() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            cancel: rx,
            deadline: None,
            keepalive: Some(Arc::new(tx)),
        }
    }

    /// A context ended by the returned handle. Dropping the handle without
    /// calling [`CancelHandle::cancel`] leaves the context live.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let tx = Arc::new(tx);
        let ctx = Self {
            cancel: rx,
            deadline: None,
            keepalive: Some(Arc::clone(&tx)),
        };
        (ctx, CancelHandle { tx })
    }

    /// A child that also ends `timeout` from now.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        self.with_deadline(deadline)
    }

    /// A child that also ends at `deadline`. The earlier deadline wins.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = self
            .deadline
            .map_or(deadline, |parent| parent.min(deadline));
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
            keepalive: self.keepalive.clone(),
        }
    }

    /// The instant this context expires, if any.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: why the context ended, or `None` while it is live.
    pub fn err(&self) -> Option<CancelReason> {
        if *self.cancel.borrow() {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context ends.
    pub async fn done(&self) -> CancelReason {
        let mut cancel = self.cancel.clone();
        let cancelled = async move {
            loop {
                if *cancel.borrow_and_update() {
                    return;
                }
                if cancel.changed().await.is_err() {
                    // Sender gone: nothing can cancel any more.
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                () = cancelled => CancelReason::Cancelled,
                () = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
            },
            None => {
                cancelled.await;
                CancelReason::Cancelled
            }
        }
    }

    /// Drive `future` to completion unless the context ends first.
    ///
    /// # Errors
    ///
    /// Returns the [`CancelReason`] when the context ends before `future`.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, CancelReason> {
        if let Some(reason) = self.err() {
            return Err(reason);
        }
        tokio::select! {
            output = future => Ok(output),
            reason = self.done() => Err(reason),
        }
    }

    /// Sleep for `duration`, waking early if the context ends.
    ///
    /// # Errors
    ///
    /// Returns the [`CancelReason`] when the context ends during the sleep.
    pub async fn sleep(&self, duration: Duration) -> Result<(), CancelReason> {
        self.run(tokio::time::sleep(duration)).await
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

fn far_future() -> Instant {
    // Roughly 30 years, the same horizon tokio uses for "never".
    Instant::now() + Duration::from_secs(86_400 * 365 * 30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_never_ends() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        let raced = tokio::time::timeout(Duration::from_millis(20), ctx.done()).await;
        assert!(raced.is_err());
    }

    #[tokio::test]
    async fn test_cancel_handle_ends_clones() {
        let (ctx, handle) = Context::with_cancel();
        let clone = ctx.clone();
        handle.cancel();
        assert_eq!(clone.err(), Some(CancelReason::Cancelled));
        assert_eq!(clone.done().await, CancelReason::Cancelled);
    }

    #[tokio::test]
    async fn test_dropped_handle_leaves_context_live() {
        let (ctx, handle) = Context::with_cancel();
        drop(handle);
        assert_eq!(ctx.err(), None);
        let raced = tokio::time::timeout(Duration::from_millis(20), ctx.done()).await;
        assert!(raced.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = Context::background().with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.err(), None);
        let started = Instant::now();
        assert_eq!(ctx.done().await, CancelReason::DeadlineExceeded);
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_keeps_earlier_parent_deadline() {
        let parent = Context::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_observes_parent_cancel() {
        let (parent, handle) = Context::with_cancel();
        let child = parent.with_timeout(Duration::from_secs(60));
        handle.cancel();
        assert_eq!(child.done().await, CancelReason::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_wakes_on_cancel() {
        let (ctx, handle) = Context::with_cancel();
        let sleeper = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.sleep(Duration::from_secs(3600)).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();
        let outcome = sleeper.await;
        assert!(matches!(outcome, Ok(Err(CancelReason::Cancelled))));
    }
}
