#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # craftform-core
//!
//! Resource model and wire codec shared by the craftform client and
//! reconciler.
//!
//! ## Wire contract
//!
//! Every resource is one flat JSON object. Positions and dimensions travel as
//! positional integer arrays whose order is part of the contract:
//!
//! | Field | Order |
//! |-------|-------|
//! | `location` | `[x, y, z]` (the world name sits beside it in `world`) |
//! | cube `dimensions` | `[length_x, height_y, width_z]` |
//! | cylinder `dimensions` | `[radius, height]` |
//!
//! ```ignore
//! use craftform_core::{Cube, CubeSpec, CubeDimensions, Location, ResourceKind};
//!
//! let spec = CubeSpec {
//!     material: "stone".into(),
//!     location: Location::new(0, 10, 0, "world"),
//!     dimensions: CubeDimensions::new(2, 2, 2),
//! };
//! assert_eq!(Cube::decode(&Cube::encode(&spec)), spec);
//! ```

pub mod error;
pub mod kinds;
pub mod model;

pub use error::{Error, Result};
pub use kinds::{
    Cube, CubeSpec, Cylinder, CylinderSpec, Entity, EntityAttributes, EntitySpec, KindTag,
    ResourceKind, ShapeAttributes,
};
pub use model::{
    CubeDimensions, CylinderDimensions, Location, RemoteResource, ResourceId, ResourceStatus,
};
