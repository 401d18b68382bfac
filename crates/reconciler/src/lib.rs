//! Create/read/update/delete for craftform resources, with confirmation
//! polling.
//!
//! The remote service applies changes asynchronously: a `201` on create only
//! means the request was accepted. The [`Reconciler`] bridges that gap by
//! reading the resource back until it settles:
//!
//! - **Create / Update**: issue the call, then poll until status `ready`
//! - **Delete**: issue the call, then poll until a read returns not-found
//!
//! # Key Concepts
//!
//! ## Poll policy
//!
//! [`PollPolicy`] bounds every wait by a wall-clock deadline (60 s by
//! default) and pauses a fixed interval (1 s) between reads. Only "still in
//! flight" is retried; any other failure ends the operation at once.
//!
//! ## Lifecycle
//!
//! ```text
//! Unconfigured -> Pending -> Ready -> Deleting -> Gone
//! ```
//!
//! ## Locks
//!
//! A shared [`ResourceLocks`] registry serializes update and delete per
//! resource id across every reconciler it is installed on.
//!
//! # Example
//!
//! ```ignore
//! use craftform_client::{Client, ClientConfig, Context};
//! use craftform_core::{Cube, CubeDimensions, CubeSpec, Location};
//! use craftform_reconciler::{Reconciler, ReconcilerBuilder};
//!
//! let reconciler: Reconciler<Cube> = ReconcilerBuilder::new()
//!     .with_api(Client::new(ClientConfig::from_env())?)
//!     .build()?;
//!
//! let spec = CubeSpec {
//!     material: "stone".into(),
//!     location: Location::new(0, 10, 0, "world"),
//!     dimensions: CubeDimensions::new(2, 2, 2),
//! };
//! let cube = reconciler.create(&Context::background(), &spec).await?;
//! reconciler.delete(&Context::background(), &cube.id).await?;
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod error;
pub mod locks;
pub mod poll;
pub mod reconciler;
pub mod types;

// Re-export main types
pub use api::ResourceApi;
pub use error::{Error, Result};
pub use locks::{ResourceGuard, ResourceLocks};
pub use poll::{Attempt, PollError, PollPolicy};
pub use reconciler::{Reconciler, ReconcilerBuilder};
pub use types::{Lifecycle, Observed};
