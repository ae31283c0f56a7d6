//! Worker pool the simulation step runs on

use crate::error::{PhysicsError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;

/// Fixed-size job pool owned by a physics context
pub struct JobPool {
    pool: ThreadPool,
}

impl std::fmt::Debug for JobPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPool")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl JobPool {
    /// Thread count used when the caller asks for 0: every core but one
    pub fn default_thread_count() -> usize {
        std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            .saturating_sub(1)
            .max(1)
    }

    /// Spin up `thread_count` workers (0 = engine default)
    pub fn new(thread_count: usize) -> Result<Self> {
        let threads = if thread_count == 0 {
            Self::default_thread_count()
        } else {
            thread_count
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("void-physics-job-{i}"))
            .build()
            .map_err(|e| PhysicsError::JobPool(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Number of worker threads
    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` on the pool and block until it finishes
    pub fn run<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
