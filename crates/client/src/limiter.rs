//! Token-bucket rate limiter shared by every call through one client.
//!
//! Implemented as a virtual-scheduling bucket: `next_free` is the instant the
//! bucket would be full again. A call is admitted once `next_free` is no more
//! than `burst - 1` token periods ahead of now. Waiting callers hold the lock,
//! so they are admitted in arrival order and the steady rate is never
//! exceeded however many tasks share the limiter.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::config::RateLimit;
use crate::context::{CancelReason, Context};

#[derive(Debug)]
pub struct RateLimiter {
    /// Time one token takes to refill; `None` disables limiting.
    period: Option<Duration>,
    /// How far ahead of now `next_free` may run before callers wait.
    tolerance: Duration,
    next_free: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        let period = (limit.per_second > 0)
            .then(|| Duration::from_secs(1) / limit.per_second);
        let tolerance = period.map_or(Duration::ZERO, |p| {
            p.saturating_mul(limit.burst.saturating_sub(1))
        });

        Self {
            period,
            tolerance,
            next_free: Mutex::new(None),
        }
    }

    /// Wait for a token.
    ///
    /// # Errors
    ///
    /// Returns the [`CancelReason`] if the context ends while queued.
    pub async fn acquire(&self, ctx: &Context) -> Result<(), CancelReason> {
        let Some(period) = self.period else {
            return Ok(());
        };

        let mut next_free = ctx.run(self.next_free.lock()).await?;

        let now = Instant::now();
        let scheduled = next_free.map_or(now, |at| at.max(now));
        let admit_at = scheduled
            .checked_sub(self.tolerance)
            .map_or(now, |at| at.max(now));

        if admit_at > now {
            trace!(wait = ?(admit_at - now), "rate limited");
            ctx.run(tokio::time::sleep_until(admit_at)).await?;
        }

        *next_free = Some(scheduled.checked_add(period).unwrap_or(scheduled));
        Ok(())
    }
}
