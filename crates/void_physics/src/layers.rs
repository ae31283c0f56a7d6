//! Object layers and collision filtering

use crate::error::PhysicsError;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Requested motion of a body, as sent across the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MotionType {
    /// Never moves, infinite mass
    Static = 0,
    /// Moved by the caller, pushes dynamic bodies
    Kinematic = 1,
    /// Fully simulated
    Dynamic = 2,
}

impl TryFrom<i32> for MotionType {
    type Error = PhysicsError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Static),
            1 => Ok(Self::Kinematic),
            2 => Ok(Self::Dynamic),
            other => Err(PhysicsError::InvalidMotionType(other)),
        }
    }
}

impl From<MotionType> for rapier::RigidBodyType {
    fn from(t: MotionType) -> Self {
        match t {
            MotionType::Static => rapier::RigidBodyType::Fixed,
            MotionType::Kinematic => rapier::RigidBodyType::KinematicPositionBased,
            MotionType::Dynamic => rapier::RigidBodyType::Dynamic,
        }
    }
}

/// Broad collision category of a body, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectLayer {
    /// Static geometry
    NonMoving,
    /// Kinematic and dynamic bodies
    Moving,
}

impl ObjectLayer {
    /// Number of object layers
    pub const COUNT: usize = 2;

    /// Layer a body with the given motion type belongs to
    pub const fn classify(motion: MotionType) -> Self {
        match motion {
            MotionType::Static => Self::NonMoving,
            MotionType::Kinematic | MotionType::Dynamic => Self::Moving,
        }
    }

    /// Get the layer as a group bitmask
    pub fn as_mask(&self) -> u32 {
        match self {
            Self::NonMoving => 1 << 0,
            Self::Moving => 1 << 1,
        }
    }
}

/// Layer-pair collision policy shared by every body in a world
///
/// Non-moving bodies collide only with moving ones; moving bodies collide
/// with everything.
#[derive(Debug, Clone)]
pub struct LayerFilter {
    /// rules[a][b]: whether layer a may touch layer b
    rules: [[bool; ObjectLayer::COUNT]; ObjectLayer::COUNT],
}

impl Default for LayerFilter {
    fn default() -> Self {
        let mut filter = Self {
            rules: [[false; ObjectLayer::COUNT]; ObjectLayer::COUNT],
        };
        filter.enable(ObjectLayer::Moving, ObjectLayer::Moving);
        filter.enable(ObjectLayer::Moving, ObjectLayer::NonMoving);
        filter
    }
}

impl LayerFilter {
    fn index(layer: ObjectLayer) -> usize {
        match layer {
            ObjectLayer::NonMoving => 0,
            ObjectLayer::Moving => 1,
        }
    }

    fn enable(&mut self, a: ObjectLayer, b: ObjectLayer) {
        self.rules[Self::index(a)][Self::index(b)] = true;
        self.rules[Self::index(b)][Self::index(a)] = true;
    }

    /// Check if two layers can collide
    pub fn should_collide(&self, a: ObjectLayer, b: ObjectLayer) -> bool {
        self.rules[Self::index(a)][Self::index(b)]
    }

    /// Mask of every layer `layer` may collide with
    pub fn filter_mask(&self, layer: ObjectLayer) -> u32 {
        [ObjectLayer::NonMoving, ObjectLayer::Moving]
            .into_iter()
            .filter(|other| self.should_collide(layer, *other))
            .fold(0u32, |acc, other| acc | other.as_mask())
    }

    /// Interaction groups for a collider on `layer`
    pub fn groups(&self, layer: ObjectLayer) -> rapier::InteractionGroups {
        rapier::InteractionGroups::new(
            rapier::Group::from_bits_truncate(layer.as_mask()),
            rapier::Group::from_bits_truncate(self.filter_mask(layer)),
        )
    }
}
