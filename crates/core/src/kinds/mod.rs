//! Resource kinds and their wire codecs.
//!
//! Each kind pairs a user-facing configuration (`Spec`) with the attributes
//! the service exchanges on the wire. `encode` and `decode` are pure and
//! inverse up to field presence: decoding never invents values, absent wire
//! fields become zero values.

mod entity;
mod shape;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use entity::{Entity, EntityAttributes, EntitySpec};
pub use shape::{Cube, CubeSpec, Cylinder, CylinderSpec, ShapeAttributes};

/// Closed set of kinds the service hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindTag {
    Cube,
    Cylinder,
    Entity,
}

impl KindTag {
    /// Collection path, relative to the API base path.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Cube => "cube/",
            Self::Cylinder => "cylinder/",
            Self::Entity => "entity/",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Cylinder => "cylinder",
            Self::Entity => "entity",
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common protocol every resource kind follows.
///
/// The engine and the client are generic over this trait, so one code path
/// serves cubes, cylinders and entities alike.
pub trait ResourceKind: Send + Sync + 'static {
    /// Kind tag, which also selects the REST collection.
    const TAG: KindTag;

    /// Desired configuration supplied by the caller.
    type Spec: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Kind-specific wire attributes; also the create/update request body.
    type Attributes: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Map a configuration onto its wire representation.
    fn encode(spec: &Self::Spec) -> Self::Attributes;

    /// Map wire attributes back onto the configuration shape.
    fn decode(attributes: &Self::Attributes) -> Self::Spec;

    /// Reject configurations before they reach the network.
    ///
    /// # Errors
    ///
    /// Returns a core error naming the offending field.
    fn validate(spec: &Self::Spec) -> Result<()>;

    /// Whether the observed data has drifted from the last-applied
    /// configuration. Kinds without a data record never drift.
    fn is_dirty(_attributes: &Self::Attributes) -> bool {
        false
    }

    /// Whether the observed data has drifted from `configured`, the
    /// configuration the caller asked for.
    fn drifted_from(attributes: &Self::Attributes, _configured: &Self::Spec) -> bool {
        Self::is_dirty(attributes)
    }

    /// Data the resource replaced when it was last applied.
    fn previous_data(_attributes: &Self::Attributes) -> &[String] {
        &[]
    }
}
