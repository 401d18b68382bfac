//! Scripted in-memory resource service shared by the engine tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use craftform_client::{Context, Error};
use craftform_core::{
    CubeDimensions, CubeSpec, Location, RemoteResource, ResourceId, ResourceKind, ResourceStatus,
};
use craftform_reconciler::ResourceApi;
use tokio::time::Instant;

/// One scripted service response.
#[derive(Debug, Clone)]
pub enum Reply {
    /// The resource, reporting this status.
    Resource(ResourceStatus),
    /// This status, but without an identifier.
    Unnamed(ResourceStatus),
    NotFound,
    Unauthorized,
    Remote(&'static str),
    /// Never answers; ends only when the caller's context does.
    Hang,
}

/// What the engine asked for.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub creates: u32,
    pub updates: u32,
    pub deletes: u32,
    pub reads: Vec<Instant>,
}

struct Script<A> {
    id: ResourceId,
    attributes: A,
    create: Reply,
    update: Reply,
    delete: Reply,
    /// Consumed front to back; the last reply repeats.
    reads: VecDeque<Reply>,
    calls: Calls,
}

/// A fake service that answers from a script and records every call.
pub struct ScriptedApi<K: ResourceKind> {
    script: Arc<Mutex<Script<K::Attributes>>>,
}

impl<K: ResourceKind> Clone for ScriptedApi<K> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
        }
    }
}

impl<K: ResourceKind> ScriptedApi<K> {
    pub fn new(id: &str, spec: &K::Spec) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                id: ResourceId::from(id),
                attributes: K::encode(spec),
                create: Reply::Resource(ResourceStatus::Creating),
                update: Reply::Resource(ResourceStatus::Updating),
                delete: Reply::Resource(ResourceStatus::Deleting),
                reads: VecDeque::from([Reply::NotFound]),
                calls: Calls::default(),
            })),
        }
    }

    pub fn on_create(self, reply: Reply) -> Self {
        self.script.lock().unwrap().create = reply;
        self
    }

    pub fn on_update(self, reply: Reply) -> Self {
        self.script.lock().unwrap().update = reply;
        self
    }

    pub fn on_delete(self, reply: Reply) -> Self {
        self.script.lock().unwrap().delete = reply;
        self
    }

    pub fn reads(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.script.lock().unwrap().reads = replies.into_iter().collect();
        self
    }

    /// Mutate the attributes every response carries.
    pub fn edit(self, edit: impl FnOnce(&mut K::Attributes)) -> Self {
        edit(&mut self.script.lock().unwrap().attributes);
        self
    }

    pub fn calls(&self) -> Calls {
        self.script.lock().unwrap().calls.clone()
    }

    fn next_read(&self) -> Reply {
        let mut script = self.script.lock().unwrap();
        script.calls.reads.push(Instant::now());
        if script.reads.len() > 1 {
            script.reads.pop_front().unwrap()
        } else {
            script.reads.front().cloned().unwrap_or(Reply::NotFound)
        }
    }

    async fn answer(&self, ctx: &Context, reply: Reply) -> craftform_client::Result<RemoteResource<K::Attributes>> {
        let (id, attributes) = {
            let script = self.script.lock().unwrap();
            (script.id.clone(), script.attributes.clone())
        };
        match reply {
            Reply::Resource(status) => Ok(RemoteResource {
                id,
                status,
                attributes,
            }),
            Reply::Unnamed(status) => Ok(RemoteResource {
                id: ResourceId::default(),
                status,
                attributes,
            }),
            Reply::NotFound => Err(Error::NotFound),
            Reply::Unauthorized => Err(Error::Unauthorized),
            Reply::Remote(message) => Err(Error::remote(message)),
            Reply::Hang => Err(Error::cancelled(ctx.done().await)),
        }
    }
}

#[async_trait]
impl<K: ResourceKind> ResourceApi<K> for ScriptedApi<K> {
    async fn create(
        &self,
        ctx: &Context,
        _attributes: &K::Attributes,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.creates += 1;
            script.create.clone()
        };
        self.answer(ctx, reply).await
    }

    async fn read(
        &self,
        ctx: &Context,
        _id: &ResourceId,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>> {
        let reply = self.next_read();
        self.answer(ctx, reply).await
    }

    async fn update(
        &self,
        ctx: &Context,
        _id: &ResourceId,
        attributes: &K::Attributes,
    ) -> craftform_client::Result<RemoteResource<K::Attributes>> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.updates += 1;
            // The service applies what it was sent.
            script.attributes = attributes.clone();
            script.update.clone()
        };
        self.answer(ctx, reply).await
    }

    async fn delete(&self, ctx: &Context, _id: &ResourceId) -> craftform_client::Result<()> {
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.deletes += 1;
            script.delete.clone()
        };
        self.answer(ctx, reply).await.map(drop)
    }
}

pub fn stone_cube() -> CubeSpec {
    CubeSpec {
        material: "stone".to_string(),
        location: Location::new(0, 10, 0, "world"),
        dimensions: CubeDimensions::new(2, 2, 2),
    }
}
