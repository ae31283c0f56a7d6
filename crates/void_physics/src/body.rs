//! Engine body handles, box creation requests and poses

use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::handle::StableBodyId;
use crate::layers::{LayerFilter, MotionType, ObjectLayer};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a rigid body inside the engine. Never leaves the crate boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineBodyHandle(pub(crate) rapier::RigidBodyHandle);

impl EngineBodyHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::RigidBodyHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::RigidBodyHandle {
        self.0
    }
}

/// Request to create a box-shaped body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRequest {
    /// Initial position
    pub position: [f64; 3],
    /// Initial orientation (quaternion: x, y, z, w)
    pub orientation: [f64; 4],
    /// Motion type
    pub motion_type: MotionType,
    /// Box half-extents
    pub half_extents: [f32; 3],
}

impl Default for BoxRequest {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            orientation: [0.0, 0.0, 0.0, 1.0],
            motion_type: MotionType::Dynamic,
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl BoxRequest {
    /// Create a dynamic unit box request
    pub fn dynamic() -> Self {
        Self::default()
    }

    /// Create a static box request
    pub fn fixed() -> Self {
        Self {
            motion_type: MotionType::Static,
            ..Default::default()
        }
    }

    /// Create a kinematic box request
    pub fn kinematic() -> Self {
        Self {
            motion_type: MotionType::Kinematic,
            ..Default::default()
        }
    }

    /// Set position
    pub fn with_position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = [x, y, z];
        self
    }

    /// Set orientation
    pub fn with_orientation(mut self, x: f64, y: f64, z: f64, w: f64) -> Self {
        self.orientation = [x, y, z, w];
        self
    }

    /// Set half-extents
    pub fn with_half_extents(mut self, hx: f32, hy: f32, hz: f32) -> Self {
        self.half_extents = [hx, hy, hz];
        self
    }

    /// Layer this request lands on
    pub fn layer(&self) -> ObjectLayer {
        ObjectLayer::classify(self.motion_type)
    }

    /// Reject poses and shapes the engine cannot build.
    ///
    /// The pose is checked after narrowing to the engine's single precision,
    /// so finite `f64` values outside the `f32` range are refused too.
    pub fn validate(&self) -> Result<()> {
        let (position, orientation) = self.narrowed();
        if position.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::EngineCreation(
                "position is not representable in single precision".into(),
            ));
        }
        if orientation.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::EngineCreation(
                "orientation is not representable in single precision".into(),
            ));
        }
        let norm_sq: f32 = orientation.iter().map(|v| v * v).sum();
        if !norm_sq.is_finite() || norm_sq <= f32::EPSILON {
            return Err(PhysicsError::EngineCreation(
                "orientation cannot be normalized".into(),
            ));
        }
        if self.half_extents.iter().any(|h| !h.is_finite() || *h <= 0.0) {
            return Err(PhysicsError::EngineCreation(
                "half extents must be positive and finite".into(),
            ));
        }
        Ok(())
    }

    fn narrowed(&self) -> ([f32; 3], [f32; 4]) {
        (
            self.position.map(|v| v as f32),
            self.orientation.map(|v| v as f32),
        )
    }

    /// Engine-side pose. The engine runs in single precision.
    pub(crate) fn isometry(&self) -> rapier::Isometry<f32> {
        let ([x, y, z], [qx, qy, qz, qw]) = self.narrowed();
        rapier::Isometry::from_parts(
            rapier::Translation::new(x, y, z),
            UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz)),
        )
    }

    /// Build a Rapier rigid body builder
    pub(crate) fn to_rapier_builder(&self, config: &PhysicsConfig) -> rapier::RigidBodyBuilder {
        let moving = self.layer() == ObjectLayer::Moving;
        rapier::RigidBodyBuilder::new(self.motion_type.into())
            .position(self.isometry())
            .can_sleep(config.sleeping_enabled)
            .ccd_enabled(moving && config.ccd_enabled)
    }

    /// Build the cuboid collider attached to the body
    pub(crate) fn to_collider_builder(
        &self,
        config: &PhysicsConfig,
        filter: &LayerFilter,
    ) -> rapier::ColliderBuilder {
        let [hx, hy, hz] = self.half_extents;
        let groups = filter.groups(self.layer());
        rapier::ColliderBuilder::cuboid(hx, hy, hz)
            .friction(config.default_friction)
            .restitution(config.default_restitution)
            .density(config.default_density)
            .collision_groups(groups)
            .solver_groups(groups)
    }
}

/// Pose of one body at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    /// Body id
    pub id: StableBodyId,
    /// World position
    pub position: [f32; 3],
    /// Orientation (quaternion: x, y, z, w)
    pub rotation: [f32; 4],
}

impl TransformSnapshot {
    /// Read the current pose of an engine body
    pub(crate) fn capture(id: StableBodyId, body: &rapier::RigidBody) -> Self {
        let pos = body.translation();
        let rot = body.rotation();
        Self {
            id,
            position: [pos.x, pos.y, pos.z],
            rotation: [rot.i, rot.j, rot.k, rot.w],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_request_defaults() {
        let req = BoxRequest::default();
        assert_eq!(req.motion_type, MotionType::Dynamic);
        assert_eq!(req.orientation, [0.0, 0.0, 0.0, 1.0]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_layer() {
        assert_eq!(BoxRequest::fixed().layer(), ObjectLayer::NonMoving);
        assert_eq!(BoxRequest::kinematic().layer(), ObjectLayer::Moving);
        assert_eq!(BoxRequest::dynamic().layer(), ObjectLayer::Moving);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let bad_extents = BoxRequest::dynamic().with_half_extents(0.5, 0.0, 0.5);
        assert!(matches!(bad_extents.validate(), Err(PhysicsError::EngineCreation(_))));

        let bad_pos = BoxRequest::dynamic().with_position(f64::NAN, 0.0, 0.0);
        assert!(bad_pos.validate().is_err());

        let zero_quat = BoxRequest::dynamic().with_orientation(0.0, 0.0, 0.0, 0.0);
        assert!(zero_quat.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_pose_outside_single_precision() {
        let far = BoxRequest::dynamic().with_position(1e40, 0.0, 0.0);
        assert!(matches!(far.validate(), Err(PhysicsError::EngineCreation(_))));

        let huge_quat = BoxRequest::dynamic().with_orientation(0.0, 0.0, 0.0, 1e40);
        assert!(matches!(huge_quat.validate(), Err(PhysicsError::EngineCreation(_))));

        // Non-zero in f64 but zero once narrowed
        let tiny_quat = BoxRequest::dynamic().with_orientation(0.0, 0.0, 0.0, 1e-50);
        assert!(matches!(tiny_quat.validate(), Err(PhysicsError::EngineCreation(_))));

        let edge = BoxRequest::dynamic().with_position(1e30, -1e30, 0.0);
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_isometry_normalizes_orientation() {
        let req = BoxRequest::dynamic()
            .with_position(1.0, 2.0, 3.0)
            .with_orientation(0.0, 0.0, 0.0, 2.0);
        let iso = req.isometry();

        assert_relative_eq!(iso.translation.vector.y, 2.0);
        assert_relative_eq!(iso.rotation.w, 1.0);
        assert_relative_eq!(iso.rotation.i, 0.0);
    }
}
