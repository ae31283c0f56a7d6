//! Transform snapshot wire format
//!
//! Each record is 36 bytes, densely packed, native byte order:
//!
//! ```text
//! ┌────────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┐
//! │ id i64 │ posX │ posY │ posZ │ rotX │ rotY │ rotZ │ rotW │
//! └────────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┘
//!   8 bytes  f32 each
//! ```

use crate::body::TransformSnapshot;
use crate::handle::StableBodyId;
use bytemuck::{Pod, Zeroable};

/// Size of one encoded record in bytes
pub const RECORD_SIZE: usize = 36;

/// One snapshot record exactly as it appears in the output buffer
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformRecord {
    id: i64,
    position: [f32; 3],
    rotation: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<TransformRecord>() == RECORD_SIZE);

impl TransformRecord {
    /// Body id
    pub fn id(&self) -> StableBodyId {
        StableBodyId(self.id)
    }

    /// World position
    pub fn position(&self) -> [f32; 3] {
        self.position
    }

    /// Orientation (quaternion: x, y, z, w)
    pub fn rotation(&self) -> [f32; 4] {
        self.rotation
    }
}

impl From<TransformSnapshot> for TransformRecord {
    fn from(s: TransformSnapshot) -> Self {
        Self {
            id: s.id.raw(),
            position: s.position,
            rotation: s.rotation,
        }
    }
}

impl From<TransformRecord> for TransformSnapshot {
    fn from(r: TransformRecord) -> Self {
        Self {
            id: r.id(),
            position: r.position(),
            rotation: r.rotation(),
        }
    }
}

/// Bytes needed to hold `count` records
pub const fn buffer_size(count: usize) -> usize {
    count * RECORD_SIZE
}

/// Appends records to a caller-owned byte buffer, never past its end
pub struct SnapshotWriter<'a> {
    out: &'a mut [u8],
    written: usize,
    dropped: usize,
}

impl<'a> SnapshotWriter<'a> {
    /// Start writing at the beginning of `out`
    pub fn new(out: &'a mut [u8]) -> Self {
        Self {
            out,
            written: 0,
            dropped: 0,
        }
    }

    /// Number of whole records `out` can take
    pub fn capacity(&self) -> usize {
        self.out.len() / RECORD_SIZE
    }

    /// Append one record. Returns false (and counts it dropped) when full.
    pub fn push(&mut self, record: TransformRecord) -> bool {
        let start = self.written * RECORD_SIZE;
        match self.out.get_mut(start..start + RECORD_SIZE) {
            Some(slot) => {
                slot.copy_from_slice(bytemuck::bytes_of(&record));
                self.written += 1;
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Records that did not fit
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Decode the first `count` records of a snapshot buffer.
///
/// Stops early if the buffer holds fewer whole records.
pub fn records(bytes: &[u8], count: usize) -> impl Iterator<Item = TransformRecord> + '_ {
    bytes
        .chunks_exact(RECORD_SIZE)
        .take(count)
        .map(bytemuck::pod_read_unaligned::<TransformRecord>)
}
