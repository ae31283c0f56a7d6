//! Physics context - owns one simulated world and everything it depends on
//!
//! Constructing a [`PhysicsContext`] initializes the world; dropping it shuts
//! the world down. Several contexts can live side by side.

use crate::body::{EngineBodyHandle, TransformSnapshot};
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::handle::{HandleTable, StableBodyId};
use crate::jobs::JobPool;
use crate::layers::LayerFilter;
use crate::scratch::ScratchArena;
use crate::step::StepStats;
use crate::world::PhysicsWorld;

/// An initialized simulation world addressed through stable body ids
pub struct PhysicsContext {
    // Fields drop in declaration order: the world goes first, then the
    // pool, arena and filter it was stepped with.
    pub(crate) world: PhysicsWorld,
    pub(crate) jobs: JobPool,
    pub(crate) scratch: ScratchArena,
    pub(crate) filter: LayerFilter,
    pub(crate) table: HandleTable,
    pub(crate) config: PhysicsConfig,
    pub(crate) stats: StepStats,
}

impl PhysicsContext {
    /// Initialize a world: scratch arena, job pool, layer filter, engine
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;

        let scratch = ScratchArena::new(config.max_bodies)?;
        let jobs = JobPool::new(config.thread_count)?;
        let filter = LayerFilter::default();
        let world = PhysicsWorld::new(&config);

        log::info!(
            "Physics context initialized: max_bodies={}, threads={}",
            config.max_bodies,
            jobs.thread_count()
        );

        Ok(Self {
            world,
            jobs,
            scratch,
            filter,
            table: HandleTable::with_capacity(config.max_bodies),
            stats: StepStats::default(),
            config,
        })
    }

    /// Tear the world down. Equivalent to dropping the context.
    pub fn shutdown(self) {
        drop(self);
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Worker threads in the job pool
    pub fn thread_count(&self) -> usize {
        self.jobs.thread_count()
    }

    /// Look up the engine handle for an id
    pub fn resolve(&self, id: StableBodyId) -> Result<EngineBodyHandle> {
        self.table.resolve(id)
    }

    /// Check if an id refers to a live body
    pub fn is_alive(&self, id: StableBodyId) -> bool {
        self.table.contains(id)
    }

    /// Remove a body from the engine and forget its id.
    ///
    /// Unknown ids are ignored; returns whether a body was destroyed. The
    /// engine removal and the unmapping run in sequence with no rollback.
    pub fn destroy(&mut self, id: StableBodyId) -> bool {
        let handle = match self.table.resolve(id) {
            Ok(handle) => handle,
            Err(_) => {
                log::trace!("Destroy of unknown body {id} ignored");
                return false;
            }
        };

        if !self.world.remove_body(handle) {
            log::warn!("Body {id} was already gone from the engine, dropping its mapping");
        }
        self.table.remove(id);

        log::debug!("Destroyed body {id}");
        true
    }

    /// Current pose of one body
    pub fn transform(&self, id: StableBodyId) -> Result<TransformSnapshot> {
        let handle = self.table.resolve(id)?;
        self.world
            .body(handle)
            .map(|body| TransformSnapshot::capture(id, body))
            .ok_or(PhysicsError::UnmappedHandle(handle))
    }

    /// Set a body's linear velocity, waking it up
    pub fn set_linear_velocity(&mut self, id: StableBodyId, velocity: [f32; 3]) -> Result<()> {
        let handle = self.table.resolve(id)?;
        if self.world.set_linear_velocity(handle, velocity) {
            Ok(())
        } else {
            Err(PhysicsError::UnmappedHandle(handle))
        }
    }

    /// Apply an impulse at a body's center of mass, waking it up
    pub fn apply_impulse(&mut self, id: StableBodyId, impulse: [f32; 3]) -> Result<()> {
        let handle = self.table.resolve(id)?;
        if self.world.apply_impulse(handle, impulse) {
            Ok(())
        } else {
            Err(PhysicsError::UnmappedHandle(handle))
        }
    }

    /// Number of bodies created through this context and still alive
    pub fn body_count(&self) -> usize {
        self.table.len()
    }

    /// Number of bodies the engine currently simulates
    pub fn active_body_count(&self) -> usize {
        self.world.active_body_count()
    }

    /// Statistics of the last step
    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    fn release_bodies(&mut self) -> usize {
        let handles: Vec<EngineBodyHandle> = self.table.iter().map(|(_, h)| h).collect();
        for handle in &handles {
            self.world.remove_body(*handle);
        }
        self.table.clear();
        handles.len()
    }
}

impl Drop for PhysicsContext {
    fn drop(&mut self) {
        let released = self.release_bodies();
        log::info!("Physics context shut down, released {released} bodies");
    }
}

impl std::fmt::Debug for PhysicsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsContext")
            .field("bodies", &self.table.len())
            .field("jobs", &self.jobs)
            .field("config", &self.config)
            .finish()
    }
}
