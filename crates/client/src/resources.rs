//! Typed CRUD calls for every [`ResourceKind`].

use craftform_core::{RemoteResource, ResourceId, ResourceKind};
use reqwest::Method;

use crate::client::Client;
use crate::context::Context;
use crate::error::Result;

/// Path of one resource inside its kind's collection.
fn member_path<K: ResourceKind>(id: &ResourceId) -> String {
    format!("{}{}", K::TAG.path_segment(), id)
}

impl Client {
    /// `POST <kind>/`: ask the service to create a resource.
    ///
    /// The response carries the assigned identifier, usually before the
    /// resource is ready.
    ///
    /// # Errors
    ///
    /// Any error from [`Client::execute`].
    pub async fn create_resource<K: ResourceKind>(
        &self,
        ctx: &Context,
        attributes: &K::Attributes,
    ) -> Result<RemoteResource<K::Attributes>> {
        let request = self.build_request(Method::POST, K::TAG.path_segment(), Some(attributes))?;
        self.execute(ctx, request).await
    }

    /// `GET <kind>/<id>`: read the current representation.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] once the resource is gone, otherwise any
    /// error from [`Client::execute`].
    pub async fn read_resource<K: ResourceKind>(
        &self,
        ctx: &Context,
        id: &ResourceId,
    ) -> Result<RemoteResource<K::Attributes>> {
        let request = self.build_request::<()>(Method::GET, &member_path::<K>(id), None)?;
        self.execute(ctx, request).await
    }

    /// `PATCH <kind>/<id>`: replace the resource's attributes.
    ///
    /// # Errors
    ///
    /// Any error from [`Client::execute`].
    pub async fn update_resource<K: ResourceKind>(
        &self,
        ctx: &Context,
        id: &ResourceId,
        attributes: &K::Attributes,
    ) -> Result<RemoteResource<K::Attributes>> {
        let request = self.build_request(Method::PATCH, &member_path::<K>(id), Some(attributes))?;
        self.execute(ctx, request).await
    }

    /// `DELETE <kind>/<id>`: ask the service to remove the resource.
    ///
    /// Acceptance only; removal completes asynchronously.
    ///
    /// # Errors
    ///
    /// Any error from [`Client::execute_unit`].
    pub async fn delete_resource<K: ResourceKind>(
        &self,
        ctx: &Context,
        id: &ResourceId,
    ) -> Result<()> {
        let request = self.build_request::<()>(Method::DELETE, &member_path::<K>(id), None)?;
        self.execute_unit(ctx, request).await
    }
}
