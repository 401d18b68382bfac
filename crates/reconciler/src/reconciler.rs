//! Reconciler implementation.

use std::marker::PhantomData;
use std::time::Duration;

use craftform_client::{Client, Context};
use craftform_core::{ResourceId, ResourceKind};
use tracing::{debug, info, warn};

use crate::api::ResourceApi;
use crate::error::{Error, Result};
use crate::locks::{ResourceGuard, ResourceLocks};
use crate::poll::{Attempt, PollError, PollPolicy};
use crate::types::{Lifecycle, Observed};

/// Drives one resource kind through create, read, update and delete,
/// waiting after every mutation until the service reports the outcome.
///
/// `A` is the service seam; it defaults to the HTTP [`Client`].
pub struct Reconciler<K: ResourceKind, A = Client> {
    api: A,
    policy: PollPolicy,
    locks: Option<ResourceLocks>,
    kind: PhantomData<fn() -> K>,
}

impl<K, A> Reconciler<K, A>
where
    K: ResourceKind,
    A: ResourceApi<K>,
{
    /// Create a reconciler without per-resource locking.
    pub const fn new(api: A, policy: PollPolicy) -> Self {
        Self {
            api,
            policy,
            locks: None,
            kind: PhantomData,
        }
    }

    /// Create a resource and wait until it is ready.
    ///
    /// The identifier is captured as soon as the service acknowledges the
    /// create. If the wait then fails, the error is [`Error::Orphaned`] and
    /// carries that identifier.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSpec`] before any call, any error from the create
    /// call, [`Error::MissingIdentifier`] if the acknowledgement has no id,
    /// or [`Error::Orphaned`] wrapping the wait failure.
    pub async fn create(&self, ctx: &Context, desired: &K::Spec) -> Result<Observed<K::Spec>> {
        K::validate(desired).map_err(|e| Error::invalid_spec(K::TAG, e))?;

        info!(kind = %K::TAG, lifecycle = %Lifecycle::Unconfigured, "creating resource");
        let created = self.api.create(ctx, &K::encode(desired)).await?;

        if created.id.is_empty() {
            warn!(kind = %K::TAG, "create acknowledged without an identifier");
            return Err(Error::MissingIdentifier { kind: K::TAG });
        }

        let id = created.id;
        info!(kind = %K::TAG, id = %id, status = %created.status, "create accepted, waiting for ready");

        self.settle(ctx, &id, Some(desired)).await.map_err(|e| {
            warn!(kind = %K::TAG, id = %id, error = %e, "created resource did not become ready");
            Error::orphaned(K::TAG, id.clone(), e)
        })
    }

    /// Take a single observation without waiting.
    ///
    /// # Errors
    ///
    /// Any error from the read call, including not-found.
    pub async fn read(&self, ctx: &Context, id: &ResourceId) -> Result<Observed<K::Spec>> {
        self.observe(ctx, id, None).await
    }

    /// Poll until the service reports the resource ready.
    ///
    /// Only a readable, not-yet-ready resource is retried. A read that is
    /// ready but carries no identifier is not ready yet. Any read error,
    /// not-found included, ends the wait immediately.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] when the policy deadline passes, [`Error::Cancelled`]
    /// when `ctx` ends, [`Error::IdentifierMismatch`] when the service answers
    /// with another resource's id, otherwise the read error.
    pub async fn wait_ready(&self, ctx: &Context, id: &ResourceId) -> Result<Observed<K::Spec>> {
        self.settle(ctx, id, None).await
    }

    /// [`Reconciler::wait_ready`], with drift measured against `configured`
    /// when the caller knows what it asked for.
    async fn settle(
        &self,
        ctx: &Context,
        id: &ResourceId,
        configured: Option<&K::Spec>,
    ) -> Result<Observed<K::Spec>> {
        let observed = self
            .policy
            .run(ctx, || async move {
                let observed = self.observe(ctx, id, configured).await?;
                debug!(kind = %K::TAG, id = %id, status = %observed.status, "observed");
                if observed.id.is_empty() {
                    return Ok::<_, Error>(Attempt::Pending(format!(
                        "{} without identifier",
                        observed.status
                    )));
                }
                if &observed.id != id {
                    return Err(Error::identifier_mismatch(K::TAG, id.clone(), observed.id));
                }
                Ok::<_, Error>(match observed.lifecycle() {
                    Lifecycle::Ready => Attempt::Done(observed),
                    _ => Attempt::Pending(observed.status.to_string()),
                })
            })
            .await
            .map_err(|e| Self::poll_error(e, id, Lifecycle::Ready))?;

        info!(kind = %K::TAG, id = %id, lifecycle = %Lifecycle::Ready, "resource ready");
        Ok(observed)
    }

    /// Replace a resource's attributes and wait until the change is observed
    /// as ready.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSpec`] before any call, any error from the update
    /// call, or any error from [`Reconciler::wait_ready`].
    pub async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        desired: &K::Spec,
    ) -> Result<Observed<K::Spec>> {
        K::validate(desired).map_err(|e| Error::invalid_spec(K::TAG, e))?;
        let _guard = self.guard(ctx, id).await?;

        info!(kind = %K::TAG, id = %id, "updating resource");
        let acknowledged = self.api.update(ctx, id, &K::encode(desired)).await?;
        debug!(kind = %K::TAG, id = %id, status = %acknowledged.status, "update accepted");

        self.settle(ctx, id, Some(desired)).await
    }

    /// Delete a resource and wait until reads report it gone.
    ///
    /// # Errors
    ///
    /// Any error from the delete call, any read error other than not-found
    /// while waiting, [`Error::Timeout`] or [`Error::Cancelled`].
    pub async fn delete(&self, ctx: &Context, id: &ResourceId) -> Result<()> {
        let _guard = self.guard(ctx, id).await?;

        info!(kind = %K::TAG, id = %id, "deleting resource");
        self.api.delete(ctx, id).await?;

        self.wait_gone(ctx, id).await
    }

    /// Poll until a read returns not-found.
    ///
    /// Any successful read counts as still deleting, whatever status it
    /// reports.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Cancelled`], or the first read error that
    /// is not not-found.
    pub async fn wait_gone(&self, ctx: &Context, id: &ResourceId) -> Result<()> {
        self.policy
            .run(ctx, || async move {
                match self.api.read(ctx, id).await {
                    Ok(remote) => {
                        debug!(kind = %K::TAG, id = %id, status = %remote.status, "still present");
                        Ok(Attempt::Pending(remote.status.to_string()))
                    }
                    Err(e) if e.is_not_found() => Ok(Attempt::Done(())),
                    Err(e) => Err(Error::from(e)),
                }
            })
            .await
            .map_err(|e| Self::poll_error(e, id, Lifecycle::Gone))?;

        info!(kind = %K::TAG, id = %id, lifecycle = %Lifecycle::Gone, "resource deleted");
        Ok(())
    }

    /// The polling policy in use.
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// The underlying service seam.
    pub const fn api(&self) -> &A {
        &self.api
    }

    async fn observe(
        &self,
        ctx: &Context,
        id: &ResourceId,
        configured: Option<&K::Spec>,
    ) -> Result<Observed<K::Spec>> {
        let remote = self.api.read(ctx, id).await?;
        let observed = match configured {
            Some(spec) => Observed::from_remote_against::<K>(&remote, spec),
            None => Observed::from_remote::<K>(&remote),
        };
        if observed.dirty {
            warn!(kind = %K::TAG, id = %id, "resource has drifted from its configured material");
        }
        Ok(observed)
    }

    async fn guard(&self, ctx: &Context, id: &ResourceId) -> Result<Option<ResourceGuard>> {
        let Some(locks) = &self.locks else {
            return Ok(None);
        };
        let key = format!("{}{}", K::TAG.path_segment(), id);
        locks
            .lock(ctx, &key)
            .await
            .map(Some)
            .map_err(|reason| Error::Cancelled { reason })
    }

    fn poll_error(err: PollError<Error>, id: &ResourceId, target: Lifecycle) -> Error {
        match err {
            PollError::Timeout { waited, attempts } => {
                warn!(kind = %K::TAG, id = %id, attempts, waited = ?waited, target = %target, "poll deadline exceeded");
                Error::Timeout {
                    kind: K::TAG,
                    id: id.clone(),
                    target: target.as_str(),
                    waited,
                }
            }
            PollError::Cancelled(reason) => Error::Cancelled { reason },
            PollError::Failed(e) => e,
        }
    }
}

impl<K: ResourceKind, A: Clone> Clone for Reconciler<K, A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            policy: self.policy,
            locks: self.locks.clone(),
            kind: PhantomData,
        }
    }
}

/// Builder for Reconciler.
pub struct ReconcilerBuilder<K: ResourceKind, A = Client> {
    api: Option<A>,
    policy: PollPolicy,
    locks: Option<ResourceLocks>,
    kind: PhantomData<fn() -> K>,
}

impl<K, A> ReconcilerBuilder<K, A>
where
    K: ResourceKind,
    A: ResourceApi<K>,
{
    /// Create a new builder.
    pub const fn new() -> Self {
        Self {
            api: None,
            policy: PollPolicy::new(crate::poll::DEFAULT_TIMEOUT, crate::poll::DEFAULT_INTERVAL),
            locks: None,
            kind: PhantomData,
        }
    }

    /// Set the service seam.
    pub fn with_api(mut self, api: A) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the whole polling policy.
    pub const fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the poll deadline.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.policy.timeout = timeout;
        self
    }

    /// Set the pause between polls.
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.policy.interval = interval;
        self
    }

    /// Serialize update and delete per resource id through `locks`.
    pub fn with_locks(mut self, locks: ResourceLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] when no API is set or the interval is zero.
    pub fn build(self) -> Result<Reconciler<K, A>> {
        let api = self
            .api
            .ok_or_else(|| Error::invalid_config("an API client is required"))?;

        if self.policy.interval.is_zero() {
            return Err(Error::invalid_config("poll interval must be non-zero"));
        }

        Ok(Reconciler {
            api,
            policy: self.policy,
            locks: self.locks,
            kind: PhantomData,
        })
    }
}

impl<K, A> Default for ReconcilerBuilder<K, A>
where
    K: ResourceKind,
    A: ResourceApi<K>,
{
    fn default() -> Self {
        Self::new()
    }
}
