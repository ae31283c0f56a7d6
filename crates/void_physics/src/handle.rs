//! Stable body ids and the table mapping them to engine handles
//!
//! Callers only ever see [`StableBodyId`]s. The table keeps a forward and a
//! reverse index in lockstep so snapshot extraction can resolve engine
//! handles without scanning every registered body.

use crate::body::EngineBodyHandle;
use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Caller-visible body identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableBodyId(pub i64);

impl StableBodyId {
    /// Sentinel returned across the boundary when creation fails
    pub const INVALID: Self = Self(-1);

    /// Get the raw id
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// Check that this is not the sentinel
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for StableBodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bidirectional stable id <-> engine handle mapping
///
/// Id allocation is atomic and may be called from several threads; the
/// mapping itself needs `&mut self` and must be serialized by the owner.
#[derive(Debug)]
pub struct HandleTable {
    /// Next id to hand out
    next_id: AtomicI64,
    /// Stable id -> engine handle
    forward: HashMap<StableBodyId, EngineBodyHandle>,
    /// Engine handle -> stable id
    reverse: HashMap<EngineBodyHandle, StableBodyId>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    /// Create an empty table; the first allocated id is 1
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// Create an empty table with room for `capacity` bodies
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            next_id: AtomicI64::new(1),
            forward: HashMap::with_capacity(capacity),
            reverse: HashMap::with_capacity(capacity),
        }
    }

    /// Issue a fresh, never-before-used id
    pub fn allocate(&self) -> StableBodyId {
        StableBodyId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Insert a mapping
    pub fn register(&mut self, id: StableBodyId, handle: EngineBodyHandle) -> Result<()> {
        if self.forward.contains_key(&id) || self.reverse.contains_key(&handle) {
            return Err(PhysicsError::DuplicateId(id));
        }
        self.forward.insert(id, handle);
        self.reverse.insert(handle, id);
        Ok(())
    }

    /// Look up the engine handle behind an id
    pub fn resolve(&self, id: StableBodyId) -> Result<EngineBodyHandle> {
        self.forward
            .get(&id)
            .copied()
            .ok_or(PhysicsError::UnknownId(id))
    }

    /// Look up the id registered for an engine handle
    pub fn reverse_resolve(&self, handle: EngineBodyHandle) -> Result<StableBodyId> {
        self.reverse
            .get(&handle)
            .copied()
            .ok_or(PhysicsError::UnmappedHandle(handle))
    }

    /// Remove a mapping. Unknown ids are ignored.
    pub fn remove(&mut self, id: StableBodyId) -> Option<EngineBodyHandle> {
        let handle = self.forward.remove(&id)?;
        self.reverse.remove(&handle);
        Some(handle)
    }

    /// Check if an id is currently mapped
    pub fn contains(&self, id: StableBodyId) -> bool {
        self.forward.contains_key(&id)
    }

    /// Number of live mappings
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Check if no body is mapped
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterate over live mappings (unordered)
    pub fn iter(&self) -> impl Iterator<Item = (StableBodyId, EngineBodyHandle)> + '_ {
        self.forward.iter().map(|(id, handle)| (*id, *handle))
    }

    /// Drop every mapping. The allocator keeps counting.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rapier3d::prelude as rapier;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn handle(index: u32) -> EngineBodyHandle {
        EngineBodyHandle::from_raw(rapier::RigidBodyHandle::from_raw_parts(index, 0))
    }

    #[test]
    fn test_allocate_starts_at_one() {
        let table = HandleTable::new();
        assert_eq!(table.allocate(), StableBodyId(1));
        assert_eq!(table.allocate(), StableBodyId(2));
        assert_eq!(table.allocate(), StableBodyId(3));
    }

    #[test]
    fn test_register_resolve_both_ways() {
        let mut table = HandleTable::new();
        let id = table.allocate();
        table.register(id, handle(7)).unwrap();

        assert_eq!(table.resolve(id).unwrap(), handle(7));
        assert_eq!(table.reverse_resolve(handle(7)).unwrap(), id);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut table = HandleTable::new();
        let id = table.allocate();
        table.register(id, handle(0)).unwrap();

        assert!(matches!(
            table.register(id, handle(1)),
            Err(PhysicsError::DuplicateId(dup)) if dup == id
        ));
        // Same engine handle under a second id is the same corruption
        let other = table.allocate();
        assert!(table.register(other, handle(0)).is_err());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unknown_and_unmapped() {
        let table = HandleTable::new();
        assert!(matches!(
            table.resolve(StableBodyId(42)),
            Err(PhysicsError::UnknownId(StableBodyId(42)))
        ));
        assert!(matches!(
            table.reverse_resolve(handle(3)),
            Err(PhysicsError::UnmappedHandle(_))
        ));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut table = HandleTable::new();
        let id = table.allocate();
        table.register(id, handle(5)).unwrap();

        assert_eq!(table.remove(id), Some(handle(5)));
        assert_eq!(table.remove(id), None);
        assert_eq!(table.remove(StableBodyId(999)), None);
        assert!(table.reverse_resolve(handle(5)).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_clear_keeps_counting() {
        let mut table = HandleTable::new();
        let id = table.allocate();
        table.register(id, handle(1)).unwrap();
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.allocate(), StableBodyId(2));
    }

    #[test]
    fn test_concurrent_allocation_is_unique() {
        let table = Arc::new(HandleTable::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || (0..1000).map(|_| table.allocate()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for t in threads {
            for id in t.join().unwrap() {
                assert!(id.is_valid());
                assert!(seen.insert(id), "id {id} issued twice");
            }
        }
        assert_eq!(seen.len(), 8000);
    }

    proptest! {
        #[test]
        fn forward_and_reverse_stay_in_lockstep(ops in proptest::collection::vec(any::<bool>(), 1..64)) {
            let mut table = HandleTable::new();
            let mut live: Vec<StableBodyId> = Vec::new();
            let mut next_index = 0u32;

            for insert in ops {
                if insert || live.is_empty() {
                    let id = table.allocate();
                    table.register(id, handle(next_index)).unwrap();
                    next_index += 1;
                    live.push(id);
                } else {
                    let id = live.swap_remove(0);
                    prop_assert!(table.remove(id).is_some());
                }

                prop_assert_eq!(table.len(), live.len());
                for id in &live {
                    let h = table.resolve(*id).unwrap();
                    prop_assert_eq!(table.reverse_resolve(h).unwrap(), *id);
                }
            }
        }
    }
}
