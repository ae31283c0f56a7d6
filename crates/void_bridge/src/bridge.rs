//! Exported C functions and the process-wide physics context they share
//!
//! Every call locks the bridge slot for its whole duration, so calls from
//! different threads are serialized. Operations on an uninitialized bridge
//! return their sentinel and record `NotInitialized`.

use parking_lot::{const_mutex, Mutex};
use void_physics::{
    is_valid_delta, BoxRequest, MotionType, PhysicsContext, PhysicsError, StableBodyId, RECORD_SIZE,
};

use crate::bootstrap;
use crate::guard::fatal;
use crate::status::{self, report, BridgeStatus};
use crate::types::{BridgeStepStats, BridgeTransform};

static BRIDGE: Mutex<Option<PhysicsContext>> = const_mutex(None);

/// Initialize the physics bridge. No-op when already initialized.
///
/// `thread_count` of 0 picks the engine default. Invalid arguments or a
/// failed initialization abort the process.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_initialize(max_bodies: i32, thread_count: i32) {
    bridge_guard!((), {
        bootstrap::init_logging();

        let mut slot = BRIDGE.lock();
        if slot.is_some() {
            log::debug!("Physics bridge already initialized");
            status::set_last(BridgeStatus::Ok);
            return;
        }

        let config = match bootstrap::overlay(bootstrap::base_config(), max_bodies, thread_count) {
            Ok(config) => config,
            Err(e) => fatal("initialize", &e),
        };
        match PhysicsContext::new(config) {
            Ok(context) => *slot = Some(context),
            Err(e) => fatal("initialize", &e),
        }
        status::set_last(BridgeStatus::Ok);
    })
}

/// Shut the bridge down, releasing every body. No-op when not initialized.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_shutdown() {
    bridge_guard!((), {
        let context = BRIDGE.lock().take();
        match context {
            Some(context) => context.shutdown(),
            None => log::debug!("Physics bridge shutdown while not initialized"),
        }
        status::set_last(BridgeStatus::Ok);
    })
}

/// Whether the bridge is initialized (1) or not (0)
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_is_initialized() -> u8 {
    bridge_guard!(0, { u8::from(BRIDGE.lock().is_some()) })
}

/// Create a box body. Returns its stable id, or -1 on failure.
#[no_mangle]
#[allow(unsafe_code)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn void_bridge_create_box(
    px: f64,
    py: f64,
    pz: f64,
    rx: f64,
    ry: f64,
    rz: f64,
    rw: f64,
    motion_type: i32,
    hx: f32,
    hy: f32,
    hz: f32,
) -> i64 {
    bridge_guard!(StableBodyId::INVALID.raw(), {
        let mut slot = BRIDGE.lock();
        let Some(context) = slot.as_mut() else {
            status::set_last(BridgeStatus::NotInitialized);
            return StableBodyId::INVALID.raw();
        };

        let motion_type = match MotionType::try_from(motion_type) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Rejected box: {e}");
                status::set_last(BridgeStatus::from(&e));
                return StableBodyId::INVALID.raw();
            }
        };

        let request = BoxRequest {
            position: [px, py, pz],
            orientation: [rx, ry, rz, rw],
            motion_type,
            half_extents: [hx, hy, hz],
        };

        match context.create_box(request) {
            Ok(id) => {
                status::set_last(BridgeStatus::Ok);
                id.raw()
            }
            Err(e @ PhysicsError::DuplicateId(_)) => fatal("create_box", &e),
            Err(e) => {
                log::warn!("Rejected box: {e}");
                status::set_last(BridgeStatus::from(&e));
                StableBodyId::INVALID.raw()
            }
        }
    })
}

/// Destroy a body. Unknown ids and an uninitialized bridge are ignored.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_destroy(id: i64) {
    bridge_guard!((), {
        let mut slot = BRIDGE.lock();
        let Some(context) = slot.as_mut() else {
            status::set_last(BridgeStatus::NotInitialized);
            return;
        };

        let outcome = if context.destroy(StableBodyId(id)) {
            BridgeStatus::Ok
        } else {
            BridgeStatus::UnknownId
        };
        status::set_last(outcome);
    })
}

/// Advance one step and write the active bodies' poses into `buffer`.
///
/// Returns the number of 36-byte records written. With a null `buffer` the
/// world still advances, and 0 is returned. A NaN, infinite or negative
/// `delta_time` skips the step and returns 0.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_step(delta_time: f32, buffer: *mut u8, buffer_len: usize) -> i32 {
    bridge_guard!(0, {
        let mut slot = BRIDGE.lock();
        let Some(context) = slot.as_mut() else {
            status::set_last(BridgeStatus::NotInitialized);
            return 0;
        };

        if !is_valid_delta(delta_time) {
            log::warn!("Rejected step with invalid delta time {delta_time}");
            status::set_last(BridgeStatus::InvalidArgument);
            return 0;
        }

        if buffer.is_null() {
            context.advance(delta_time);
            log::warn!("{}", PhysicsError::BufferResolution);
            status::set_last(BridgeStatus::BufferResolution);
            return 0;
        }

        // SAFETY: buffer is non-null and valid for buffer_len bytes per
        // caller contract; the slice does not outlive this call.
        let out = unsafe { std::slice::from_raw_parts_mut(buffer, buffer_len) };
        let written = context.step(delta_time, out);

        let outcome = if context.stats().dropped_records > 0 {
            BridgeStatus::BufferTooSmall
        } else {
            BridgeStatus::Ok
        };
        status::set_last(outcome);
        i32::try_from(written).unwrap_or(i32::MAX)
    })
}

/// Copy the current pose of body `id` into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_get_transform(id: i64, out: *mut BridgeTransform) -> i32 {
    bridge_guard!(BridgeStatus::Panicked as i32, {
        if out.is_null() {
            return report(BridgeStatus::InvalidArgument);
        }
        let slot = BRIDGE.lock();
        let Some(context) = slot.as_ref() else {
            return report(BridgeStatus::NotInitialized);
        };

        match context.transform(StableBodyId(id)) {
            Ok(snapshot) => {
                // SAFETY: out is non-null and valid per caller contract.
                unsafe { out.write(BridgeTransform::from(snapshot)) };
                report(BridgeStatus::Ok)
            }
            Err(e) => report(BridgeStatus::from(&e)),
        }
    })
}

/// Set the linear velocity of body `id`, waking it up.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_set_linear_velocity(id: i64, vx: f32, vy: f32, vz: f32) -> i32 {
    bridge_guard!(BridgeStatus::Panicked as i32, {
        let mut slot = BRIDGE.lock();
        let Some(context) = slot.as_mut() else {
            return report(BridgeStatus::NotInitialized);
        };

        match context.set_linear_velocity(StableBodyId(id), [vx, vy, vz]) {
            Ok(()) => report(BridgeStatus::Ok),
            Err(e) => report(BridgeStatus::from(&e)),
        }
    })
}

/// Apply an impulse at the center of mass of body `id`, waking it up.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_apply_impulse(id: i64, ix: f32, iy: f32, iz: f32) -> i32 {
    bridge_guard!(BridgeStatus::Panicked as i32, {
        let mut slot = BRIDGE.lock();
        let Some(context) = slot.as_mut() else {
            return report(BridgeStatus::NotInitialized);
        };

        match context.apply_impulse(StableBodyId(id), [ix, iy, iz]) {
            Ok(()) => report(BridgeStatus::Ok),
            Err(e) => report(BridgeStatus::from(&e)),
        }
    })
}

/// Copy the statistics of the last step into `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_stats(out: *mut BridgeStepStats) -> i32 {
    bridge_guard!(BridgeStatus::Panicked as i32, {
        if out.is_null() {
            return report(BridgeStatus::InvalidArgument);
        }
        let slot = BRIDGE.lock();
        let Some(context) = slot.as_ref() else {
            return report(BridgeStatus::NotInitialized);
        };

        let stats = BridgeStepStats::capture(context.stats(), context.body_count());
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { out.write(stats) };
        report(BridgeStatus::Ok)
    })
}

/// Status of the most recent bridge call on the calling thread
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_last_status() -> i32 {
    status::last().into()
}

/// Size in bytes of one snapshot record
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn void_bridge_record_size() -> u32 {
    RECORD_SIZE as u32
}
