//! Step & snapshot - advance the world and serialize the active set

use crate::body::TransformSnapshot;
use crate::context::PhysicsContext;
use crate::snapshot::SnapshotWriter;
use std::time::{Duration, Instant};

/// What the last step did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    /// Steps taken since initialization
    pub tick: u64,
    /// Wall time spent inside the engine step
    pub duration: Duration,
    /// Bodies the engine simulated after the step
    pub active_bodies: usize,
    /// Records written to the snapshot buffer
    pub records_written: usize,
    /// Active bodies with no stable id
    pub unmapped_skipped: usize,
    /// Records that did not fit the snapshot buffer
    pub dropped_records: usize,
    /// Bodies in the engine
    pub total_bodies: usize,
    /// Static bodies in the engine
    pub static_bodies: usize,
    /// Body capacity
    pub max_bodies: usize,
    /// Contact pairs from the narrow phase
    pub contact_pairs: usize,
    /// Solver contacts across those pairs
    pub contact_constraints: usize,
}

/// Whether `delta_time` can be integrated: finite and not negative
pub fn is_valid_delta(delta_time: f32) -> bool {
    delta_time.is_finite() && delta_time >= 0.0
}

impl PhysicsContext {
    /// Run exactly one engine step of `delta_time` seconds.
    ///
    /// Blocks until the job pool has finished the step. A NaN, infinite or
    /// negative delta is skipped: the world and the stats stay untouched.
    pub fn advance(&mut self, delta_time: f32) -> &StepStats {
        if !is_valid_delta(delta_time) {
            log::warn!("Skipping step with invalid delta time {delta_time}");
            return &self.stats;
        }

        let start = Instant::now();
        self.world.step(delta_time, &self.jobs);
        let duration = start.elapsed();

        let load = self.world.contact_load();
        if self.world.contact_budget_exceeded(&load) {
            log::warn!(
                "Contact budget exceeded: {} pairs, {} constraints",
                load.body_pairs,
                load.contact_constraints
            );
        }

        self.stats = StepStats {
            tick: self.stats.tick + 1,
            duration,
            active_bodies: self.world.active_body_count(),
            total_bodies: self.world.body_count(),
            static_bodies: self.world.static_body_count(),
            max_bodies: self.world.max_bodies(),
            contact_pairs: load.body_pairs,
            contact_constraints: load.contact_constraints,
            ..StepStats::default()
        };

        log::trace!(
            "Step {} took {:?} ({} active)",
            self.stats.tick,
            duration,
            self.stats.active_bodies
        );
        &self.stats
    }

    /// Write one record per active body into `out` and return how many.
    ///
    /// Bodies without a stable id are skipped. Records past the end of `out`
    /// are dropped, never written.
    pub fn write_snapshot(&mut self, out: &mut [u8]) -> usize {
        let resolved = self.scratch.begin();
        let mut unmapped = 0;
        for handle in self.world.active_bodies() {
            match self.table.reverse_resolve(handle) {
                Ok(id) => resolved.push((id, handle)),
                Err(e) => {
                    unmapped += 1;
                    log::trace!("Skipping active body: {e}");
                }
            }
        }

        let mut writer = SnapshotWriter::new(out);
        for &(id, handle) in self.scratch.resolved() {
            if let Some(body) = self.world.body(handle) {
                writer.push(TransformSnapshot::capture(id, body).into());
            }
        }

        let written = writer.written();
        let dropped = writer.dropped();
        if dropped > 0 {
            log::warn!(
                "Snapshot buffer holds {} records, dropped {}",
                writer.capacity(),
                dropped
            );
        }

        self.stats.records_written = written;
        self.stats.unmapped_skipped = unmapped;
        self.stats.dropped_records = dropped;
        written
    }

    /// Advance one step, then snapshot the active bodies into `out`.
    ///
    /// An invalid delta skips both and returns 0.
    pub fn step(&mut self, delta_time: f32, out: &mut [u8]) -> usize {
        if !is_valid_delta(delta_time) {
            log::warn!("Skipping step with invalid delta time {delta_time}");
            return 0;
        }
        self.advance(delta_time);
        self.write_snapshot(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::body::BoxRequest;
    use crate::config::PhysicsConfig;
    use crate::context::PhysicsContext;
    use crate::handle::StableBodyId;
    use crate::snapshot::{buffer_size, records, RECORD_SIZE};
    use super::is_valid_delta;
    use approx::assert_relative_eq;
    use rapier3d::prelude as rapier;

    const DT: f32 = 1.0 / 60.0;

    fn context() -> PhysicsContext {
        PhysicsContext::new(PhysicsConfig::default().with_thread_count(1)).unwrap()
    }

    #[test]
    fn test_tick_counts_steps() {
        let mut ctx = context();
        assert_eq!(ctx.advance(DT).tick, 1);
        assert_eq!(ctx.advance(DT).tick, 2);
    }

    #[test]
    fn test_static_bodies_are_not_reported() {
        let mut ctx = context();
        ctx.create_box(BoxRequest::fixed()).unwrap();
        let dynamic = ctx
            .create_box(BoxRequest::dynamic().with_position(0.0, 5.0, 0.0))
            .unwrap();

        let mut buf = vec![0u8; buffer_size(4)];
        let n = ctx.step(DT, &mut buf);

        assert_eq!(n, 1);
        let ids: Vec<_> = records(&buf, n).map(|r| r.id()).collect();
        assert_eq!(ids, vec![dynamic]);
        assert_eq!(ctx.stats().static_bodies, 1);
        assert_eq!(ctx.stats().total_bodies, 2);
    }

    #[test]
    fn test_unmapped_active_body_is_skipped() {
        let mut ctx = context();
        let mapped = ctx.create_box(BoxRequest::dynamic()).unwrap();
        ctx.world.insert_raw(
            rapier::RigidBodyBuilder::dynamic().translation(rapier::Vector::new(10.0, 0.0, 0.0)),
            rapier::ColliderBuilder::cuboid(0.5, 0.5, 0.5),
        );

        let mut buf = vec![0u8; buffer_size(4)];
        let n = ctx.step(DT, &mut buf);

        assert_eq!(n, 1);
        assert_eq!(records(&buf, n).next().map(|r| r.id()), Some(mapped));
        assert_eq!(ctx.stats().unmapped_skipped, 1);
        assert_eq!(ctx.stats().active_bodies, 2);
    }

    #[test]
    fn test_short_buffer_truncates() {
        let mut ctx = context();
        for i in 0..3 {
            ctx.create_box(BoxRequest::dynamic().with_position(i as f64 * 3.0, 0.0, 0.0))
                .unwrap();
        }

        let mut buf = vec![0xEEu8; buffer_size(2) + 10];
        let n = ctx.step(DT, &mut buf);

        assert_eq!(n, 2);
        assert_eq!(ctx.stats().dropped_records, 1);
        assert!(buf[2 * RECORD_SIZE..].iter().all(|b| *b == 0xEE));
    }

    #[test]
    fn test_empty_buffer_still_advances() {
        let mut ctx = context();
        let id = ctx
            .create_box(BoxRequest::dynamic().with_position(0.0, 10.0, 0.0))
            .unwrap();

        assert_eq!(ctx.step(DT, &mut []), 0);
        assert_eq!(ctx.stats().dropped_records, 1);
        assert!(ctx.transform(id).unwrap().position[1] < 10.0);
    }

    #[test]
    fn test_invalid_delta_is_skipped() {
        let mut ctx = context();
        let id = ctx
            .create_box(BoxRequest::dynamic().with_position(0.0, 5.0, 0.0))
            .unwrap();
        assert!(!is_valid_delta(f32::NAN));
        assert!(!is_valid_delta(f32::INFINITY));
        assert!(!is_valid_delta(-1.0));
        assert!(is_valid_delta(0.0));

        let mut buf = vec![0xEEu8; buffer_size(2)];
        for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -1.0] {
            assert_eq!(ctx.step(dt, &mut buf), 0);
        }

        assert_eq!(ctx.stats().tick, 0);
        assert!(buf.iter().all(|b| *b == 0xEE));
        let t = ctx.transform(id).unwrap();
        assert_relative_eq!(t.position[1], 5.0);
        assert!(t.rotation.iter().all(|v| v.is_finite()));

        // A valid step afterwards behaves normally
        assert_eq!(ctx.step(DT, &mut buf), 1);
        assert!(ctx.transform(id).unwrap().position[1] < 5.0);
    }

    #[test]
    fn test_destroyed_body_never_reported() {
        let mut ctx = context();
        let keep = ctx.create_box(BoxRequest::dynamic()).unwrap();
        let gone = ctx
            .create_box(BoxRequest::dynamic().with_position(5.0, 0.0, 0.0))
            .unwrap();
        ctx.destroy(gone);

        let mut buf = vec![0u8; buffer_size(4)];
        let n = ctx.step(DT, &mut buf);
        let ids: Vec<StableBodyId> = records(&buf, n).map(|r| r.id()).collect();
        assert_eq!(ids, vec![keep]);
    }
}
