//! Value types shared by every resource kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identifier assigned by the remote service on creation.
///
/// Once assigned it never changes for the lifetime of the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the service has not assigned an identifier.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Lifecycle status reported by the remote service.
///
/// `Ready` is the only terminal status a read can report; removal is observed
/// as a 404 rather than as a status value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Initializing,
    Creating,
    Updating,
    Ready,
    Deleting,
    /// Any status string this client does not recognise.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ResourceStatus {
    /// Whether a create or update has settled.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Wire spelling of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Creating => "creating",
            Self::Updating => "updating",
            Self::Ready => "ready",
            Self::Deleting => "deleting",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A block position inside a named world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub world: String,
}

impl Location {
    /// Create a location.
    pub fn new(x: i64, y: i64, z: i64, world: impl Into<String>) -> Self {
        Self {
            x,
            y,
            z,
            world: world.into(),
        }
    }

    /// Coordinates in wire order `[x, y, z]`.
    pub const fn coordinates(&self) -> [i64; 3] {
        [self.x, self.y, self.z]
    }

    /// Rebuild a location from its wire triple and world name.
    pub fn from_coordinates([x, y, z]: [i64; 3], world: &str) -> Self {
        Self::new(x, y, z, world)
    }

    /// Reject locations the service cannot place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] when the world name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.world.trim().is_empty() {
            return Err(Error::missing_field("world"));
        }
        Ok(())
    }
}

/// Extent of a cube along each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeDimensions {
    pub length_x: i64,
    pub height_y: i64,
    pub width_z: i64,
}

impl CubeDimensions {
    pub const fn new(length_x: i64, height_y: i64, width_z: i64) -> Self {
        Self {
            length_x,
            height_y,
            width_z,
        }
    }

    /// Wire order: length, height, width.
    pub const fn to_wire(self) -> [i64; 3] {
        [self.length_x, self.height_y, self.width_z]
    }

    pub const fn from_wire([length_x, height_y, width_z]: [i64; 3]) -> Self {
        Self::new(length_x, height_y, width_z)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] when any extent is not positive.
    pub fn validate(&self) -> Result<()> {
        positive("length_x", self.length_x)?;
        positive("height_y", self.height_y)?;
        positive("width_z", self.width_z)
    }
}

/// Extent of an upright cylinder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CylinderDimensions {
    pub height: i64,
    pub radius: i64,
}

impl CylinderDimensions {
    pub const fn new(height: i64, radius: i64) -> Self {
        Self { height, radius }
    }

    /// Wire order: radius, height.
    pub const fn to_wire(self) -> [i64; 2] {
        [self.radius, self.height]
    }

    pub const fn from_wire([radius, height]: [i64; 2]) -> Self {
        Self::new(height, radius)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] when height or radius is not positive.
    pub fn validate(&self) -> Result<()> {
        positive("height", self.height)?;
        positive("radius", self.radius)
    }
}

fn positive(field: &str, value: i64) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::invalid_record(format!(
            "{field} must be positive, got {value}"
        )))
    }
}

/// The service's view of a managed object: identity, status and the
/// kind-specific attributes flattened beside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResource<A> {
    #[serde(default)]
    pub id: ResourceId,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(flatten)]
    pub attributes: A,
}
