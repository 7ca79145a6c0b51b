//! Fixed-size worker pool

use crate::config::{SchedulerConfig, ShutdownMode};
use crate::core::Result;
use crate::pool::worker::{Worker, WorkerStats};
use crate::queue::PriorityJobQueue;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Point-in-time pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Jobs accepted by the scheduler
    pub jobs_submitted: u64,
    /// Jobs that completed successfully
    pub jobs_processed: u64,
    /// Jobs that returned an error
    pub jobs_failed: u64,
    /// Jobs that panicked
    pub jobs_panicked: u64,
    /// Time workers spent running jobs, whatever the outcome (microseconds)
    pub busy_time_us: u64,
    /// Jobs currently waiting in the queue
    pub queue_depth: usize,
    /// Worker threads still running
    pub live_workers: usize,
}

/// A fixed set of worker threads consuming a shared [`PriorityJobQueue`]
///
/// The pool does not own job submission; anything holding the same queue can
/// feed it. [`Scheduler`](crate::Scheduler) is the usual front end.
///
/// # Example
///
/// ```rust
/// use priority_scheduler::core::{ClosureTask, Job, Priority};
/// use priority_scheduler::pool::WorkerPool;
/// use priority_scheduler::queue::PriorityJobQueue;
/// use std::sync::Arc;
///
/// # fn main() -> priority_scheduler::Result<()> {
/// let queue = Arc::new(PriorityJobQueue::new());
/// let pool = WorkerPool::new(2, Arc::clone(&queue))?;
/// pool.start()?;
///
/// queue.push(Job::new(Priority::High, 0, Box::new(ClosureTask::new(|| Ok(())))));
///
/// pool.stop();
/// # Ok(())
/// # }
/// ```
pub struct WorkerPool {
    config: SchedulerConfig,
    queue: Arc<PriorityJobQueue>,
    /// Stop signal of the current run. Serializes `start` and `stop`; each
    /// `start` installs a fresh one so detached workers never see it cleared.
    shutdown: Mutex<Arc<AtomicBool>>,
    workers: Mutex<Vec<Worker>>,
    stats: RwLock<Vec<Arc<WorkerStats>>>,
    running: AtomicBool,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("queue_depth", &self.queue.len())
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool of `num_workers` threads over `queue`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when `num_workers` is zero.
    pub fn new(num_workers: usize, queue: Arc<PriorityJobQueue>) -> Result<Self> {
        Self::with_config(SchedulerConfig::new(num_workers), queue)
    }

    /// Create a pool with a full configuration
    pub fn with_config(config: SchedulerConfig, queue: Arc<PriorityJobQueue>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            queue,
            shutdown: Mutex::new(Arc::new(AtomicBool::new(false))),
            workers: Mutex::new(Vec::new()),
            stats: RwLock::new(Vec::new()),
            running: AtomicBool::new(false),
        })
    }

    /// Start the worker threads
    ///
    /// Does nothing if the pool is already running. A stopped pool can be
    /// started again; it gets fresh workers and fresh statistics. Workers a
    /// previous [`stop`](Self::stop) detached keep their own, already raised,
    /// stop signal and exit once their last job returns.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the OS refuses a thread. Workers spawned before
    /// the failure are stopped again and the pool stays not running.
    pub fn start(&self) -> Result<()> {
        let mut shutdown = self.shutdown.lock();
        if self.running.load(Ordering::Acquire) {
            return Ok(());
        }

        let signal = Arc::new(AtomicBool::new(false));
        let mut spawned = Vec::with_capacity(self.config.num_workers);
        for id in 0..self.config.num_workers {
            match Worker::new(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&signal),
                &self.config,
            ) {
                Ok(worker) => spawned.push(worker),
                Err(e) => {
                    signal.store(true, Ordering::Release);
                    for worker in spawned {
                        worker.join_timeout(self.config.join_timeout);
                    }
                    return Err(e);
                }
            }
        }

        *shutdown = signal;
        *self.stats.write() = spawned.iter().map(Worker::stats).collect();
        *self.workers.lock() = spawned;
        self.running.store(true, Ordering::Release);

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_start(self.config.num_workers);
        #[cfg(not(feature = "tracing"))]
        log::debug!(
            "worker pool '{}' started with {} workers",
            self.config.thread_name_prefix,
            self.config.num_workers
        );

        Ok(())
    }

    /// Signal every worker to stop and wait for them to exit
    ///
    /// Each worker finishes the job it is running. With
    /// [`ShutdownMode::Abandon`] nothing else is taken from the queue; with
    /// [`ShutdownMode::Drain`] workers first empty it. Joins happen one after
    /// another, each bounded by the configured join timeout; a worker that
    /// overruns it is detached, not killed. Calling this on a stopped pool
    /// does nothing.
    ///
    /// The worker list is handed off before joining, so
    /// [`live_workers`](Self::live_workers) and [`snapshot`](Self::snapshot)
    /// stay responsive while this blocks.
    pub fn stop(&self) {
        let shutdown = self.shutdown.lock();
        shutdown.store(true, Ordering::Release);
        if !self.running.load(Ordering::Acquire) {
            return;
        }

        let stopping = std::mem::take(&mut *self.workers.lock());
        let mut detached = 0;
        for worker in stopping {
            if !worker.join_timeout(self.config.join_timeout) {
                detached += 1;
            }
        }
        self.running.store(false, Ordering::Release);
        drop(shutdown);

        if detached > 0 {
            log::warn!(
                "worker pool '{}' stopped with {} worker(s) still finishing a job",
                self.config.thread_name_prefix,
                detached
            );
        }

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_shutdown(
            self.total_jobs_processed(),
            self.total_jobs_failed(),
        );
        #[cfg(not(feature = "tracing"))]
        log::debug!(
            "worker pool '{}' stopped ({} processed, {} failed)",
            self.config.thread_name_prefix,
            self.total_jobs_processed(),
            self.total_jobs_failed()
        );
    }

    /// Check if the pool is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Get the configured number of worker threads
    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    /// Number of worker threads that are still alive.
    ///
    /// Drops below [`num_workers`](Self::num_workers) when workers exit after
    /// a failed job under [`FailurePolicy::TerminateWorker`](crate::FailurePolicy).
    pub fn live_workers(&self) -> usize {
        self.workers.lock().iter().filter(|w| w.is_alive()).count()
    }

    /// The configuration this pool was built with
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The queue the workers consume
    pub fn queue(&self) -> &Arc<PriorityJobQueue> {
        &self.queue
    }

    /// Whether stopping discards the backlog
    pub fn abandons_backlog(&self) -> bool {
        self.config.shutdown_mode == ShutdownMode::Abandon
    }

    /// Get statistics for all workers of the current (or last) run
    pub fn get_stats(&self) -> Vec<Arc<WorkerStats>> {
        self.stats.read().clone()
    }

    /// Get total jobs processed across all workers
    pub fn total_jobs_processed(&self) -> u64 {
        self.stats.read().iter().map(|s| s.get_jobs_processed()).sum()
    }

    /// Get total jobs failed across all workers
    pub fn total_jobs_failed(&self) -> u64 {
        self.stats.read().iter().map(|s| s.get_jobs_failed()).sum()
    }

    /// Get total jobs panicked across all workers
    pub fn total_jobs_panicked(&self) -> u64 {
        self.stats.read().iter().map(|s| s.get_jobs_panicked()).sum()
    }

    /// Get total time spent running jobs across all workers (microseconds)
    pub fn total_busy_time_us(&self) -> u64 {
        self.stats.read().iter().map(|s| s.get_busy_time_us()).sum()
    }

    /// Snapshot of the pool counters; `jobs_submitted` is left at zero for
    /// the owner to fill in
    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            jobs_submitted: 0,
            jobs_processed: self.total_jobs_processed(),
            jobs_failed: self.total_jobs_failed(),
            jobs_panicked: self.total_jobs_panicked(),
            busy_time_us: self.total_busy_time_us(),
            queue_depth: self.queue.len(),
            live_workers: self.live_workers(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.running.load(Ordering::Acquire) {
            self.stop();
        }
    }
}
