//! C-compatible structs filled by the bridge

use void_physics::{StepStats, TransformSnapshot};

/// Pose of one body
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BridgeTransform {
    /// Stable body id
    pub id: i64,
    /// World position
    pub position: [f32; 3],
    /// Orientation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl From<TransformSnapshot> for BridgeTransform {
    fn from(s: TransformSnapshot) -> Self {
        Self {
            id: s.id.raw(),
            position: s.position,
            rotation: s.rotation,
        }
    }
}

/// Statistics of the most recent step.
///
/// Counts are fixed-width `u32` (saturating) for ABI portability.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeStepStats {
    /// Steps taken since initialize
    pub tick: u64,
    /// Wall time of the engine step, in microseconds
    pub duration_us: u64,
    /// Bodies the engine simulated after the step
    pub active_bodies: u32,
    /// Records written to the caller's buffer
    pub records_written: u32,
    /// Active engine bodies with no stable id
    pub unmapped_skipped: u32,
    /// Records that did not fit the caller's buffer
    pub dropped_records: u32,
    /// Bodies in the engine
    pub total_bodies: u32,
    /// Static bodies in the engine
    pub static_bodies: u32,
    /// Body capacity
    pub max_bodies: u32,
    /// Bodies created through the bridge and not yet destroyed
    pub registered_bodies: u32,
    /// Contact pairs after the step
    pub contact_pairs: u32,
    /// Solver contacts after the step
    pub contact_constraints: u32,
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl BridgeStepStats {
    pub(crate) fn capture(stats: &StepStats, registered_bodies: usize) -> Self {
        Self {
            tick: stats.tick,
            duration_us: u64::try_from(stats.duration.as_micros()).unwrap_or(u64::MAX),
            active_bodies: saturate(stats.active_bodies),
            records_written: saturate(stats.records_written),
            unmapped_skipped: saturate(stats.unmapped_skipped),
            dropped_records: saturate(stats.dropped_records),
            total_bodies: saturate(stats.total_bodies),
            static_bodies: saturate(stats.static_bodies),
            max_bodies: saturate(stats.max_bodies),
            registered_bodies: saturate(registered_bodies),
            contact_pairs: saturate(stats.contact_pairs),
            contact_constraints: saturate(stats.contact_constraints),
        }
    }
}
