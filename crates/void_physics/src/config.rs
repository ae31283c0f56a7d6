//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on broad-phase body pairs tracked per step
pub const MAX_BODY_PAIRS: usize = 20_480;

/// Upper bound on contact constraints solved per step
pub const MAX_CONTACT_CONSTRAINTS: usize = 65_536;

/// Physics context configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Maximum number of bodies the world may hold
    pub max_bodies: usize,

    /// Worker threads for the job pool (0 = engine default)
    pub thread_count: usize,

    /// Gravity vector (default: -9.81 in Y)
    pub gravity: [f32; 3],

    /// Solver iterations per step
    pub solver_iterations: usize,

    /// Enable sleeping for inactive bodies
    pub sleeping_enabled: bool,

    /// Enable continuous collision detection on moving bodies
    pub ccd_enabled: bool,

    /// Default friction coefficient
    pub default_friction: f32,

    /// Default restitution (bounciness)
    pub default_restitution: f32,

    /// Default collider density
    pub default_density: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_bodies: 1024,
            thread_count: 0,
            gravity: [0.0, -9.81, 0.0],
            solver_iterations: 4,
            sleeping_enabled: true,
            ccd_enabled: false,
            default_friction: 0.5,
            default_restitution: 0.0,
            default_density: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Parse a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PhysicsError::InvalidConfig(e.to_string()))
    }

    /// Set body capacity
    pub fn with_max_bodies(mut self, max_bodies: usize) -> Self {
        self.max_bodies = max_bodies;
        self
    }

    /// Set worker thread count
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Check that the configuration can back a world
    pub fn validate(&self) -> Result<()> {
        if self.max_bodies == 0 {
            return Err(PhysicsError::InvalidConfig("max_bodies must be positive".into()));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver_iterations must be positive".into(),
            ));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(PhysicsError::InvalidConfig("gravity must be finite".into()));
        }
        if self.default_density <= 0.0 || !self.default_density.is_finite() {
            return Err(PhysicsError::InvalidConfig(
                "default_density must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = PhysicsConfig::default().with_max_bodies(0);
        assert!(matches!(config.validate(), Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_gravity_rejected() {
        let config = PhysicsConfig::default().with_gravity(0.0, f32::NAN, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = PhysicsConfig::from_json(r#"{ "max_bodies": 16, "gravity": [0.0, -1.0, 0.0] }"#)
            .unwrap();
        assert_eq!(config.max_bodies, 16);
        assert_eq!(config.gravity, [0.0, -1.0, 0.0]);
        assert_eq!(config.solver_iterations, PhysicsConfig::default().solver_iterations);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            PhysicsConfig::from_json("{ max_bodies"),
            Err(PhysicsError::InvalidConfig(_))
        ));
    }
}
