//! C-compatible status codes
//!
//! [`BridgeStatus`] is a `repr(i32)` enum with one code per physics error
//! kind. Calls that return a sentinel instead of a status still record one,
//! readable through `void_bridge_last_status`.

use std::cell::Cell;
use void_physics::PhysicsError;

/// Status code returned by status-returning bridge calls.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeStatus {
    /// Success.
    Ok = 0,
    /// Bridge used before initialize or after shutdown.
    NotInitialized = -1,
    /// A stable id was registered twice.
    DuplicateId = -2,
    /// Id was never issued or has been destroyed.
    UnknownId = -3,
    /// Engine body without a stable id.
    UnmappedHandle = -4,
    /// Output buffer pointer was null.
    BufferResolution = -5,
    /// Engine refused to create a body.
    EngineCreation = -6,
    /// Motion type code outside 0..=2.
    InvalidMotionType = -7,
    /// Configuration rejected.
    InvalidConfig = -8,
    /// Scratch memory could not be reserved.
    AllocationFailed = -9,
    /// Worker threads could not be started.
    JobPool = -10,
    /// A pointer argument is null or a value is out of range.
    InvalidArgument = -11,
    /// Snapshot buffer too small, some records were dropped.
    BufferTooSmall = -12,
    /// A Rust panic was caught at the boundary.
    Panicked = -128,
}

impl From<&PhysicsError> for BridgeStatus {
    fn from(e: &PhysicsError) -> Self {
        match e {
            PhysicsError::NotInitialized => BridgeStatus::NotInitialized,
            PhysicsError::DuplicateId(_) => BridgeStatus::DuplicateId,
            PhysicsError::UnknownId(_) => BridgeStatus::UnknownId,
            PhysicsError::UnmappedHandle(_) => BridgeStatus::UnmappedHandle,
            PhysicsError::BufferResolution => BridgeStatus::BufferResolution,
            PhysicsError::EngineCreation(_) => BridgeStatus::EngineCreation,
            PhysicsError::InvalidMotionType(_) => BridgeStatus::InvalidMotionType,
            PhysicsError::InvalidConfig(_) => BridgeStatus::InvalidConfig,
            PhysicsError::AllocationFailed(_) => BridgeStatus::AllocationFailed,
            PhysicsError::JobPool(_) => BridgeStatus::JobPool,
        }
    }
}

impl From<BridgeStatus> for i32 {
    fn from(status: BridgeStatus) -> Self {
        status as i32
    }
}

thread_local! {
    static LAST_STATUS: Cell<BridgeStatus> = const { Cell::new(BridgeStatus::Ok) };
}

/// Record the outcome of the current call on this thread
pub(crate) fn set_last(status: BridgeStatus) {
    LAST_STATUS.with(|cell| cell.set(status));
}

/// Record a status and hand it back as the C return value
pub(crate) fn report(status: BridgeStatus) -> i32 {
    set_last(status);
    status.into()
}

/// Outcome of the most recent bridge call on this thread
pub fn last() -> BridgeStatus {
    LAST_STATUS.with(Cell::get)
}
