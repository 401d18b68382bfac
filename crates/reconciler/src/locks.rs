//! Per-resource mutual exclusion.
//!
//! A [`ResourceLocks`] registry hands out one async mutex per key. Callers
//! that share a registry never run two guarded operations on the same key at
//! once; different keys never contend. Entries nobody holds or waits on are
//! pruned on the next acquisition, so the registry stays as small as the set
//! of keys in use.

use std::collections::HashMap;
use std::sync::Arc;

use craftform_client::{CancelReason, Context};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Held for the duration of a guarded operation; releases on drop.
#[derive(Debug)]
pub struct ResourceGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl ResourceGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Named-lock registry. Clones share the same locks.
#[derive(Debug, Clone, Default)]
pub struct ResourceLocks {
    entries: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    ///
    /// # Errors
    ///
    /// Returns the [`CancelReason`] if `ctx` ends while waiting.
    pub async fn lock(&self, ctx: &Context, key: &str) -> Result<ResourceGuard, CancelReason> {
        let entry = {
            let mut entries = ctx.run(self.entries.lock()).await?;
            // Only the registry holds an idle entry.
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(entries.entry(key.to_string()).or_default())
        };

        trace!(key, "waiting for resource lock");
        let guard = ctx.run(entry.lock_owned()).await?;
        trace!(key, "resource lock acquired");

        Ok(ResourceGuard {
            key: key.to_string(),
            _guard: guard,
        })
    }

    /// Number of keys currently tracked.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_same_key_is_serialized() {
        let locks = ResourceLocks::new();
        let ctx = Context::background();
        let started = Instant::now();

        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let locks = locks.clone();
                tokio::spawn(async move {
                    let _guard = locks.lock(&Context::background(), "cube/c-1").await.unwrap();
                    tokio::time::sleep(Duration::from_secs(1)).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(started.elapsed(), Duration::from_secs(3));
        let guard = locks.lock(&ctx, "cube/c-1").await.unwrap();
        assert_eq!(guard.key(), "cube/c-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_keys_run_concurrently() {
        let locks = ResourceLocks::new();
        let started = Instant::now();

        let tasks: Vec<_> = ["cube/a", "cube/b", "entity/a"]
            .into_iter()
            .map(|key| {
                let locks = locks.clone();
                tokio::spawn(async move {
                    let _guard = locks.lock(&Context::background(), key).await.unwrap();
                    tokio::time::sleep(Duration::from_secs(1)).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_is_cancellable() {
        let locks = ResourceLocks::new();
        let _held = locks.lock(&Context::background(), "cube/c-1").await.unwrap();

        let ctx = Context::background().with_timeout(Duration::from_millis(200));
        let outcome = locks.lock(&ctx, "cube/c-1").await;

        assert_eq!(outcome.unwrap_err(), CancelReason::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = ResourceLocks::new();
        let ctx = Context::background();

        drop(locks.lock(&ctx, "cube/a").await.unwrap());
        drop(locks.lock(&ctx, "cube/b").await.unwrap());
        let _held = locks.lock(&ctx, "cube/c").await.unwrap();

        assert_eq!(locks.len().await, 1);
    }
}
