//! Per-step scratch memory
//!
//! Reserved once at initialization for the full body capacity and reset at
//! the start of every snapshot, so steady-state stepping does not allocate.

use crate::body::EngineBodyHandle;
use crate::error::{PhysicsError, Result};
use crate::handle::StableBodyId;

/// Reusable buffer of (id, handle) pairs resolved during one snapshot
#[derive(Debug)]
pub struct ScratchArena {
    resolved: Vec<(StableBodyId, EngineBodyHandle)>,
}

impl ScratchArena {
    /// Reserve room for `capacity` resolved bodies
    pub fn new(capacity: usize) -> Result<Self> {
        let mut resolved = Vec::new();
        resolved.try_reserve_exact(capacity).map_err(|e| {
            PhysicsError::AllocationFailed(format!(
                "scratch arena for {capacity} bodies: {e}"
            ))
        })?;
        Ok(Self { resolved })
    }

    /// Reset and hand out the buffer for a new snapshot
    pub fn begin(&mut self) -> &mut Vec<(StableBodyId, EngineBodyHandle)> {
        self.resolved.clear();
        &mut self.resolved
    }

    /// Entries resolved in the current snapshot
    pub fn resolved(&self) -> &[(StableBodyId, EngineBodyHandle)] {
        &self.resolved
    }

    /// Reserved capacity
    pub fn capacity(&self) -> usize {
        self.resolved.capacity()
    }
}
