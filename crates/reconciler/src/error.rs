//! Error types for the reconciler crate.

use std::time::Duration;

use craftform_client::CancelReason;
use craftform_core::{KindTag, ResourceId};
use thiserror::Error;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug, Error)]
pub enum Error {
    /// The desired configuration was rejected before any call was made.
    #[error("invalid {kind} configuration: {source}")]
    InvalidSpec {
        kind: KindTag,
        #[source]
        source: craftform_core::Error,
    },

    /// A call to the service failed.
    #[error(transparent)]
    Client(craftform_client::Error),

    /// A poll loop ran out of time before the resource settled.
    #[error("timed out after {waited:?} waiting for {kind} '{id}' to become {target}")]
    Timeout {
        kind: KindTag,
        id: ResourceId,
        target: &'static str,
        waited: Duration,
    },

    /// The caller's context ended first.
    #[error("operation cancelled: {reason}")]
    Cancelled { reason: CancelReason },

    /// The service accepted a create but assigned no identifier.
    #[error(
        "{kind} create was accepted without an identifier; a resource may exist that nothing tracks"
    )]
    MissingIdentifier { kind: KindTag },

    /// A read answered for a different resource than the one asked for.
    #[error("{kind} '{expected}' was read back as '{found}'")]
    IdentifierMismatch {
        kind: KindTag,
        expected: ResourceId,
        found: ResourceId,
    },

    /// Create succeeded but waiting for readiness failed.
    ///
    /// The resource exists server-side; `id` must be recorded by the caller.
    #[error("{kind} '{id}' was created but did not become ready: {source}")]
    Orphaned {
        kind: KindTag,
        id: ResourceId,
        #[source]
        source: Box<Error>,
    },

    /// Invalid reconciler configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<craftform_client::Error> for Error {
    fn from(err: craftform_client::Error) -> Self {
        match err {
            craftform_client::Error::Cancelled { reason } => Self::Cancelled { reason },
            other => Self::Client(other),
        }
    }
}

impl Error {
    /// Create an invalid spec error.
    pub const fn invalid_spec(kind: KindTag, source: craftform_core::Error) -> Self {
        Self::InvalidSpec { kind, source }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Wrap a failed readiness wait after a successful create.
    pub fn orphaned(kind: KindTag, id: ResourceId, source: Self) -> Self {
        Self::Orphaned {
            kind,
            id,
            source: Box::new(source),
        }
    }

    /// Create an identifier mismatch error.
    pub const fn identifier_mismatch(kind: KindTag, expected: ResourceId, found: ResourceId) -> Self {
        Self::IdentifierMismatch {
            kind,
            expected,
            found,
        }
    }

    /// Whether a poll deadline expired, looking through [`Error::Orphaned`].
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Orphaned { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Whether the caller's context ended, looking through [`Error::Orphaned`].
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::Orphaned { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Identifier of a resource that exists but whose create did not finish.
    pub const fn orphaned_id(&self) -> Option<&ResourceId> {
        match self {
            Self::Orphaned { id, .. } => Some(id),
            _ => None,
        }
    }
}
