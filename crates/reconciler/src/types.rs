//! Core types for the reconciler.

use std::fmt;

use craftform_core::{RemoteResource, ResourceId, ResourceKind, ResourceStatus};
use serde::{Deserialize, Serialize};

/// Lifecycle of one managed resource as the engine sees it.
///
/// ```text
/// Unconfigured -> Pending -> Ready -> Deleting -> Gone
/// ```
///
/// `Ready` ends a create or update, `Gone` ends a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Nothing has been issued yet.
    Unconfigured,
    /// Issued; the service has not reported a terminal status.
    Pending,
    /// The service reports the resource ready.
    Ready,
    /// Removal accepted, the resource is still readable.
    Deleting,
    /// Reads return not-found.
    Gone,
}

impl Lifecycle {
    /// Map a status the service reported onto the lifecycle.
    pub const fn from_status(status: ResourceStatus) -> Self {
        match status {
            ResourceStatus::Ready => Self::Ready,
            ResourceStatus::Deleting => Self::Deleting,
            ResourceStatus::Initializing
            | ResourceStatus::Creating
            | ResourceStatus::Updating
            | ResourceStatus::Unknown => Self::Pending,
        }
    }

    /// Whether polling stops here.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Gone)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Deleting => "deleting",
            Self::Gone => "gone",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded snapshot of a remote resource.
///
/// `spec` is the configuration shape recovered from the wire, so it can be
/// compared directly against what the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observed<S> {
    pub id: ResourceId,
    pub status: ResourceStatus,
    pub spec: S,
    /// The service's data no longer matches the last-applied material.
    pub dirty: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_data: Vec<String>,
}

impl<S> Observed<S> {
    /// Decode a remote snapshot through its kind's codec.
    pub fn from_remote<K>(remote: &RemoteResource<K::Attributes>) -> Self
    where
        K: ResourceKind<Spec = S>,
    {
        Self {
            id: remote.id.clone(),
            status: remote.status,
            spec: K::decode(&remote.attributes),
            dirty: K::is_dirty(&remote.attributes),
            previous_data: K::previous_data(&remote.attributes).to_vec(),
        }
    }

    /// Decode a remote snapshot, measuring drift against `configured`
    /// instead of the material the service reports.
    pub fn from_remote_against<K>(remote: &RemoteResource<K::Attributes>, configured: &S) -> Self
    where
        K: ResourceKind<Spec = S>,
    {
        Self {
            dirty: K::drifted_from(&remote.attributes, configured),
            ..Self::from_remote::<K>(remote)
        }
    }

    pub const fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_status(self.status)
    }
}

impl<S: PartialEq> Observed<S> {
    /// Whether the remote resource differs from `desired`, either in its
    /// attributes or through drifted data.
    pub fn diverges_from(&self, desired: &S) -> bool {
        self.dirty || &self.spec != desired
    }
}
