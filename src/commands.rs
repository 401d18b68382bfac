//! Execute one CLI action against the resource service.

use anyhow::{Context as _, Result};
use craftform_client::{Client, Context};
use craftform_core::{ResourceId, ResourceKind};
use craftform_reconciler::{PollPolicy, Reconciler, ReconcilerBuilder};
use serde_json::{Value, json};
use tracing::warn;

/// A parsed action, independent of the resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<S> {
    Create(S),
    Read(ResourceId),
    Update(ResourceId, S),
    Delete(ResourceId),
}

/// Build a reconciler for `K` on top of a shared client.
pub fn reconciler<K: ResourceKind>(client: Client, policy: PollPolicy) -> Result<Reconciler<K>> {
    ReconcilerBuilder::new()
        .with_api(client)
        .with_policy(policy)
        .build()
        .context("invalid poll settings")
}

/// Run `action` and describe the outcome as JSON.
pub async fn run<K: ResourceKind>(
    reconciler: &Reconciler<K>,
    ctx: &Context,
    action: Action<K::Spec>,
) -> Result<Value> {
    match action {
        Action::Create(spec) => {
            let observed = reconciler.create(ctx, &spec).await.inspect_err(|e| {
                if let Some(id) = e.orphaned_id() {
                    warn!(kind = %K::TAG, id = %id, "record this id: the resource exists but never became ready");
                }
            })?;
            Ok(serde_json::to_value(observed)?)
        }
        Action::Read(id) => {
            let observed = reconciler
                .read(ctx, &id)
                .await
                .with_context(|| format!("failed to read {} '{id}'", K::TAG))?;
            Ok(serde_json::to_value(observed)?)
        }
        Action::Update(id, spec) => {
            let observed = reconciler
                .update(ctx, &id, &spec)
                .await
                .with_context(|| format!("failed to update {} '{id}'", K::TAG))?;
            if observed.diverges_from(&spec) {
                warn!(kind = %K::TAG, id = %id, "service reports ready but differs from the requested configuration");
            }
            Ok(serde_json::to_value(observed)?)
        }
        Action::Delete(id) => {
            reconciler
                .delete(ctx, &id)
                .await
                .with_context(|| format!("failed to delete {} '{id}'", K::TAG))?;
            Ok(json!({ "id": id, "kind": K::TAG, "deleted": true }))
        }
    }
}
