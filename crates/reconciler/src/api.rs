//! The seam between the engine and the remote service.

use async_trait::async_trait;
use craftform_client::{Client, Context};
use craftform_core::{RemoteResource, ResourceId, ResourceKind};

/// CRUD calls the engine needs for one resource kind.
///
/// [`Client`] is the production implementation; tests substitute a
/// scripted service.
#[async_trait]
pub trait ResourceApi<K: ResourceKind>: Send + Sync {
    /// Ask the service to create a resource.
    async fn create(
        &self,
        ctx: &Context,
        attributes: &K::Attributes,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>>;

    /// Read the current representation.
    async fn read(
        &self,
        ctx: &Context,
        id: &ResourceId,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>>;

    /// Replace the resource's attributes.
    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        attributes: &K::Attributes,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>>;

    /// Ask the service to remove the resource.
    async fn delete(&self, ctx: &Context, id: &ResourceId) -> craftform_client::Result<()>;
}

#[async_trait]
impl<K: ResourceKind> ResourceApi<K> for Client {
    async fn create(
        &self,
        ctx: &Context,
        attributes: &K::Attributes,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>> {
        self.create_resource::<K>(ctx, attributes).await
    }

    async fn read(
        &self,
        ctx: &Context,
        id: &ResourceId,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>> {
        self.read_resource::<K>(ctx, id).await
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        attributes: &K::Attributes,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>> {
        self.update_resource::<K>(ctx, id, attributes).await
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId) -> craftform_client::Result<()> {
        self.delete_resource::<K>(ctx, id).await
    }
}
