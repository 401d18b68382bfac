//! Spawned entities (mobs, armour stands, ...). No dimensions, no drift.

use serde::{Deserialize, Serialize};

use super::{KindTag, ResourceKind};
use crate::error::{Error, Result};
use crate::model::Location;

/// Wire attributes of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityAttributes {
    pub entity_type: String,
    pub custom_name: String,
    pub world: String,
    pub location: [i64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity;

/// Desired configuration of an entity. `custom_name` may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub entity_type: String,
    #[serde(default)]
    pub custom_name: String,
    pub location: Location,
}

impl ResourceKind for Entity {
    const TAG: KindTag = KindTag::Entity;

    type Spec = EntitySpec;
    type Attributes = EntityAttributes;

    fn encode(spec: &EntitySpec) -> EntityAttributes {
        EntityAttributes {
            entity_type: spec.entity_type.clone(),
            custom_name: spec.custom_name.clone(),
            world: spec.location.world.clone(),
            location: spec.location.coordinates(),
        }
    }

    fn decode(attributes: &EntityAttributes) -> EntitySpec {
        EntitySpec {
            entity_type: attributes.entity_type.clone(),
            custom_name: attributes.custom_name.clone(),
            location: Location::from_coordinates(attributes.location, &attributes.world),
        }
    }

    fn validate(spec: &EntitySpec) -> Result<()> {
        if spec.entity_type.trim().is_empty() {
            return Err(Error::missing_field("entity_type"));
        }
        spec.location.validate()
    }
}
