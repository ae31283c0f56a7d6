//! Void Bridge - C ABI over the physics context
//!
//! A managed runtime drives one process-wide [`PhysicsContext`] through the
//! `void_bridge_*` functions. Body ids are plain `i64`s; each step the bridge
//! fills a caller-owned buffer with one 36-byte record per active body:
//!
//! ```text
//! offset  0: i64 id
//! offset  8: f32 x, y, z
//! offset 20: f32 qx, qy, qz, qw
//! ```
//!
//! Failures never unwind into the caller. Operations return sentinels
//! (`-1` ids, `0` record counts) or a [`BridgeStatus`], and every call leaves
//! its outcome in `void_bridge_last_status`. The header is generated into
//! `include/void_bridge.h` at build time.
//!
//! [`PhysicsContext`]: void_physics::PhysicsContext

#![deny(unsafe_code)]

#[macro_use]
mod guard;

pub mod bootstrap;
pub mod bridge;
pub mod status;
pub mod types;

pub use bridge::*;
pub use status::BridgeStatus;
pub use types::{BridgeStepStats, BridgeTransform};
