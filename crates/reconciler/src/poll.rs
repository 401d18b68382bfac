//! Poll-until-settled policy shared by create, update and delete.
//!
//! An attempt either settles ([`Attempt::Done`]), reports that the resource
//! is still in flight ([`Attempt::Pending`]) or fails. Only `Pending` is
//! retried; a failure ends the loop on the spot.

use std::future::Future;
use std::time::Duration;

use craftform_client::{CancelReason, Context};
use tokio::time::Instant;
use tracing::debug;

/// Default wall-clock budget for one wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default pause between reads.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one poll attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Terminal state reached.
    Done(T),
    /// Not settled yet; the string names what was observed.
    Pending(String),
}

/// Why a poll loop stopped without settling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollError<E> {
    /// The deadline passed while the resource was still pending.
    Timeout { waited: Duration, attempts: u32 },
    /// The context ended between attempts.
    Cancelled(CancelReason),
    /// An attempt failed with a non-retryable error.
    Failed(E),
}

/// Fixed-interval retry bounded by a wall-clock deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum time to keep polling.
    pub timeout: Duration,
    /// Pause between attempts.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl PollPolicy {
    /// Create a policy.
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Set the deadline.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the interval.
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Number of attempts a loop that never settles makes:
    /// one immediately, then one per interval up to and including the deadline.
    pub fn max_attempts(&self) -> u32 {
        if self.interval.is_zero() {
            return u32::MAX;
        }
        let timeout = self.timeout.as_nanos();
        let interval = self.interval.as_nanos();
        let sleeps = timeout.div_ceil(interval);
        u32::try_from(sleeps).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    /// Run `attempt` until it settles, fails, the deadline passes or `ctx`
    /// ends.
    ///
    /// The first attempt runs immediately. After a pending attempt the loop
    /// sleeps for the interval, shortened so the final attempt lands exactly
    /// on the deadline; a pending attempt at or past the deadline is a
    /// timeout.
    ///
    /// # Errors
    ///
    /// See [`PollError`].
    pub async fn run<T, E, F, Fut>(&self, ctx: &Context, mut attempt: F) -> Result<T, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>, E>>,
    {
        let started = Instant::now();
        let deadline = started.checked_add(self.timeout).unwrap_or(started);
        let mut attempts: u32 = 0;

        loop {
            if let Some(reason) = ctx.err() {
                return Err(PollError::Cancelled(reason));
            }

            attempts = attempts.saturating_add(1);
            let observed = match attempt().await {
                Ok(Attempt::Done(value)) => return Ok(value),
                Ok(Attempt::Pending(observed)) => observed,
                Err(err) => return Err(PollError::Failed(err)),
            };

            let now = Instant::now();
            if now >= deadline {
                return Err(PollError::Timeout {
                    waited: now.saturating_duration_since(started),
                    attempts,
                });
            }

            debug!(attempt = attempts, observed = %observed, "not settled, polling again");
            let pause = self.interval.min(deadline.saturating_duration_since(now));
            ctx.sleep(pause).await.map_err(PollError::Cancelled)?;
        }
    }
}
