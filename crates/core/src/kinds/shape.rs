//! Block shapes: cubes and cylinders share one wire layout and differ only in
//! the arity of their positional `dimensions` array.

use serde::{Deserialize, Serialize};

use super::{KindTag, ResourceKind};
use crate::error::{Error, Result};
use crate::model::{CubeDimensions, CylinderDimensions, Location};

/// Wire attributes of a shape.
///
/// `D` is the positional dimensions array: `[length, height, width]` for a
/// cube, `[radius, height]` for a cylinder. Fixed-size arrays make a wrong
/// arity a decode failure instead of a silently misread field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    default,
    bound(deserialize = "D: Deserialize<'de> + Default")
)]
pub struct ShapeAttributes<D> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<KindTag>,
    pub material: String,
    pub world: String,
    pub location: [i64; 3],
    pub dimensions: D,
    /// Blocks the shape replaced when it was placed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub previous_data: Vec<String>,
    /// Blocks currently observed inside the shape's volume.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub current_data: Vec<String>,
}

impl<D> ShapeAttributes<D> {
    fn request(tag: KindTag, material: &str, location: &Location, dimensions: D) -> Self {
        Self {
            shape_type: Some(tag),
            material: material.to_string(),
            world: location.world.clone(),
            location: location.coordinates(),
            dimensions,
            previous_data: Vec::new(),
            current_data: Vec::new(),
        }
    }

    /// Decoded location.
    pub fn location(&self) -> Location {
        Location::from_coordinates(self.location, &self.world)
    }

    /// True when any observed block differs from the applied material.
    pub fn has_drifted(&self) -> bool {
        self.has_drifted_from(&self.material)
    }

    /// True when any observed block differs from `material`.
    pub fn has_drifted_from(&self, material: &str) -> bool {
        self.current_data.iter().any(|block| block != material)
    }
}

fn require_material(material: &str) -> Result<()> {
    if material.trim().is_empty() {
        return Err(Error::missing_field("material"));
    }
    Ok(())
}

/// Axis-aligned box of a single material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cube;

/// Desired configuration of a cube.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeSpec {
    pub material: String,
    pub location: Location,
    pub dimensions: CubeDimensions,
}

impl ResourceKind for Cube {
    const TAG: KindTag = KindTag::Cube;

    type Spec = CubeSpec;
    type Attributes = ShapeAttributes<[i64; 3]>;

    fn encode(spec: &CubeSpec) -> Self::Attributes {
        ShapeAttributes::request(
            Self::TAG,
            &spec.material,
            &spec.location,
            spec.dimensions.to_wire(),
        )
    }

    fn decode(attributes: &Self::Attributes) -> CubeSpec {
        CubeSpec {
            material: attributes.material.clone(),
            location: attributes.location(),
            dimensions: CubeDimensions::from_wire(attributes.dimensions),
        }
    }

    fn validate(spec: &CubeSpec) -> Result<()> {
        require_material(&spec.material)?;
        spec.location.validate()?;
        spec.dimensions.validate()
    }

    fn is_dirty(attributes: &Self::Attributes) -> bool {
        attributes.has_drifted()
    }

    fn drifted_from(attributes: &Self::Attributes, configured: &Self::Spec) -> bool {
        attributes.has_drifted_from(&configured.material)
    }

    fn previous_data(attributes: &Self::Attributes) -> &[String] {
        &attributes.previous_data
    }
}

/// Upright cylinder of a single material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cylinder;

/// Desired configuration of a cylinder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CylinderSpec {
    pub material: String,
    pub location: Location,
    pub dimensions: CylinderDimensions,
}

impl ResourceKind for Cylinder {
    const TAG: KindTag = KindTag::Cylinder;

    type Spec = CylinderSpec;
    type Attributes = ShapeAttributes<[i64; 2]>;

    fn encode(spec: &CylinderSpec) -> Self::Attributes {
        ShapeAttributes::request(
            Self::TAG,
            &spec.material,
            &spec.location,
            spec.dimensions.to_wire(),
        )
    }

    fn decode(attributes: &Self::Attributes) -> CylinderSpec {
        CylinderSpec {
            material: attributes.material.clone(),
            location: attributes.location(),
            dimensions: CylinderDimensions::from_wire(attributes.dimensions),
        }
    }

    fn validate(spec: &CylinderSpec) -> Result<()> {
        require_material(&spec.material)?;
        spec.location.validate()?;
        spec.dimensions.validate()
    }

    fn is_dirty(attributes: &Self::Attributes) -> bool {
        attributes.has_drifted()
    }

    fn drifted_from(attributes: &Self::Attributes, configured: &Self::Spec) -> bool {
        attributes.has_drifted_from(&configured.material)
    }

    fn previous_data(attributes: &Self::Attributes) -> &[String] {
        &attributes.previous_data
    }
}
