//! Physics world - Rapier simulation container

use crate::body::{BoxRequest, EngineBodyHandle};
use crate::config::{PhysicsConfig, MAX_BODY_PAIRS, MAX_CONTACT_CONSTRAINTS};
use crate::error::{PhysicsError, Result};
use crate::jobs::JobPool;
use crate::layers::LayerFilter;
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;

/// Engine state: body and collider sets plus the pipeline stepping them.
///
/// Knows nothing about stable ids; the owning context maps those.
pub struct PhysicsWorld {
    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager (tracks awake bodies)
    islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joint set
    impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joint set
    multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Rigid body set
    bodies: rapier::RigidBodySet,

    /// Collider set
    colliders: rapier::ColliderSet,

    /// Body capacity
    max_bodies: usize,
}

/// Contact load after a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactLoad {
    /// Body pairs tracked by the narrow phase
    pub body_pairs: usize,
    /// Solver contacts generated for those pairs
    pub contact_constraints: usize,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: &PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations).unwrap_or(NonZeroUsize::MIN);

        Self {
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            max_bodies: config.max_bodies,
        }
    }

    // ==================== Rigid Bodies ====================

    /// Insert a box body with its collider and wake it up
    pub fn create_box(
        &mut self,
        request: &BoxRequest,
        config: &PhysicsConfig,
        filter: &LayerFilter,
    ) -> Result<EngineBodyHandle> {
        if self.bodies.len() >= self.max_bodies {
            return Err(PhysicsError::EngineCreation(format!(
                "body capacity of {} reached",
                self.max_bodies
            )));
        }
        request.validate()?;

        let handle = self.bodies.insert(request.to_rapier_builder(config));
        self.colliders.insert_with_parent(
            request.to_collider_builder(config, filter),
            handle,
            &mut self.bodies,
        );
        if let Some(body) = self.bodies.get_mut(handle) {
            body.wake_up(true);
        }

        Ok(EngineBodyHandle(handle))
    }

    /// Insert an arbitrary body. Bodies created here have no stable id.
    #[cfg(test)]
    pub(crate) fn insert_raw(
        &mut self,
        body: rapier::RigidBodyBuilder,
        collider: rapier::ColliderBuilder,
    ) -> EngineBodyHandle {
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        EngineBodyHandle(handle)
    }

    /// Deactivate and remove a body together with its colliders.
    ///
    /// Returns false if the engine no longer knew the body.
    pub fn remove_body(&mut self, handle: EngineBodyHandle) -> bool {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true, // Remove attached colliders
            )
            .is_some()
    }

    /// Get a body
    pub fn body(&self, handle: EngineBodyHandle) -> Option<&rapier::RigidBody> {
        self.bodies.get(handle.0)
    }

    /// Set rigid body linear velocity
    pub fn set_linear_velocity(&mut self, handle: EngineBodyHandle, velocity: [f32; 3]) -> bool {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.set_linvel(rapier::Vector::new(velocity[0], velocity[1], velocity[2]), true);
            })
            .is_some()
    }

    /// Apply an impulse to a rigid body
    pub fn apply_impulse(&mut self, handle: EngineBodyHandle, impulse: [f32; 3]) -> bool {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.apply_impulse(rapier::Vector::new(impulse[0], impulse[1], impulse[2]), true);
            })
            .is_some()
    }

    // ==================== Simulation ====================

    /// Advance the simulation by exactly one step of `delta_time`.
    ///
    /// The pipeline runs on the job pool; this blocks until it is done.
    pub fn step(&mut self, delta_time: f32, jobs: &JobPool) {
        self.integration_params.dt = delta_time;

        let Self {
            pipeline,
            gravity,
            integration_params,
            islands,
            broad_phase,
            narrow_phase,
            impulse_joints,
            multibody_joints,
            ccd_solver,
            bodies,
            colliders,
            ..
        } = self;

        jobs.run(|| {
            pipeline.step(
                gravity,
                integration_params,
                islands,
                broad_phase,
                narrow_phase,
                bodies,
                colliders,
                impulse_joints,
                multibody_joints,
                ccd_solver,
                None,
                &(),
                &(),
            );
        });
    }

    /// Bodies the engine currently simulates (awake dynamic and kinematic)
    pub fn active_bodies(&self) -> impl Iterator<Item = EngineBodyHandle> + '_ {
        self.islands
            .active_dynamic_bodies()
            .iter()
            .chain(self.islands.active_kinematic_bodies())
            .copied()
            .map(EngineBodyHandle)
    }

    /// Contact pairs and constraints produced by the last step
    pub fn contact_load(&self) -> ContactLoad {
        let mut load = ContactLoad::default();
        for pair in self.narrow_phase.contact_pairs() {
            load.body_pairs += 1;
            load.contact_constraints += pair
                .manifolds
                .iter()
                .map(|m| m.data.solver_contacts.len())
                .sum::<usize>();
        }
        load
    }

    /// Check the last step's contact load against the fixed budgets
    pub fn contact_budget_exceeded(&self, load: &ContactLoad) -> bool {
        load.body_pairs > MAX_BODY_PAIRS || load.contact_constraints > MAX_CONTACT_CONSTRAINTS
    }

    // ==================== Debug ====================

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of static bodies
    pub fn static_body_count(&self) -> usize {
        self.bodies.iter().filter(|(_, b)| b.is_fixed()).count()
    }

    #[cfg(test)]
    fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Get number of active (awake) bodies
    pub fn active_body_count(&self) -> usize {
        self.islands.active_dynamic_bodies().len() + self.islands.active_kinematic_bodies().len()
    }

    /// Body capacity
    pub fn max_bodies(&self) -> usize {
        self.max_bodies
    }
}
