//! Void Physics - Rapier 3D context with stable body ids
//!
//! Bodies are created through a [`PhysicsContext`] and addressed by
//! [`StableBodyId`]s, which never change for the lifetime of a body and are
//! never reused. Each step writes the pose of every active body into a
//! caller-owned byte buffer as fixed 36-byte records.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 PhysicsContext                    │
//! │  ┌─────────────┐  ┌─────────────┐  ┌───────────┐ │
//! │  │ HandleTable │  │ LayerFilter │  │ JobPool   │ │
//! │  │ id <-> body │  │ 2 layers    │  │ (rayon)   │ │
//! │  └─────────────┘  └─────────────┘  └───────────┘ │
//! │  ┌──────────────────────────────────────────────┐│
//! │  │ PhysicsWorld (RigidBodySet, ColliderSet,     ││
//! │  │               PhysicsPipeline)               ││
//! │  └──────────────────────────────────────────────┘│
//! └──────────────────────────────────────────────────┘
//!                        │ step
//!                        ▼
//!          ScratchArena ──► SnapshotWriter ──► [u8]
//! ```
//!
//! # Example
//!
//! ```no_run
//! use void_physics::prelude::*;
//!
//! let mut physics = PhysicsContext::new(PhysicsConfig::default())?;
//!
//! physics.create_box(BoxRequest::fixed().with_half_extents(50.0, 0.5, 50.0))?;
//! let crate_id = physics.create_box(BoxRequest::dynamic().with_position(0.0, 10.0, 0.0))?;
//!
//! let mut buf = vec![0u8; buffer_size(16)];
//! let written = physics.step(1.0 / 60.0, &mut buf);
//!
//! for record in records(&buf, written) {
//!     println!("{} at {:?}", record.id(), record.position());
//! }
//!
//! physics.destroy(crate_id);
//! # Ok::<(), PhysicsError>(())
//! ```

pub mod body;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod handle;
pub mod jobs;
pub mod layers;
pub mod scratch;
pub mod snapshot;
pub mod step;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{BoxRequest, EngineBodyHandle, TransformSnapshot};
    pub use crate::config::PhysicsConfig;
    pub use crate::context::PhysicsContext;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::handle::{HandleTable, StableBodyId};
    pub use crate::layers::{LayerFilter, MotionType, ObjectLayer};
    pub use crate::snapshot::{buffer_size, records, TransformRecord, RECORD_SIZE};
    pub use crate::step::{is_valid_delta, StepStats};
}

pub use prelude::*;
