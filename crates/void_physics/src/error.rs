//! Error types for the physics system

use crate::body::EngineBodyHandle;
use crate::handle::StableBodyId;
use thiserror::Error;

/// Physics system errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Operation attempted before initialize or after shutdown
    #[error("Physics context is not initialized")]
    NotInitialized,

    /// Id already present in the handle table (allocator corruption)
    #[error("Stable body id {0} is already registered")]
    DuplicateId(StableBodyId),

    /// Id was never issued or has already been destroyed
    #[error("Unknown stable body id {0}")]
    UnknownId(StableBodyId),

    /// Engine reported a body this layer never registered
    #[error("Engine body {0:?} has no stable id")]
    UnmappedHandle(EngineBodyHandle),

    /// Output buffer address could not be obtained
    #[error("Snapshot output buffer could not be resolved")]
    BufferResolution,

    /// Engine refused to create a body
    #[error("Failed to create body: {0}")]
    EngineCreation(String),

    /// Motion type code outside Static/Kinematic/Dynamic
    #[error("Invalid motion type: {0}")]
    InvalidMotionType(i32),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Temporary arena could not be reserved
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    /// Worker pool could not be started
    #[error("Failed to start job pool: {0}")]
    JobPool(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
