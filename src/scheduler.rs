//! Scheduler front end: sequencing, submission and lifecycle

use crate::config::{SchedulerConfig, ShutdownMode};
use crate::core::{ClosureTask, Job, Priority, Result, SchedulerError, Task};
use crate::pool::{PoolStats, WorkerPool};
use crate::queue::PriorityJobQueue;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Priority job scheduler backed by a fixed worker pool
///
/// Jobs with a higher priority are dequeued before jobs with a lower one;
/// jobs with equal priority are dequeued in submission order. Nothing flows
/// back to the submitter: a job's outcome is only visible in the logs and
/// in [`stats`](Self::stats).
///
/// # Shutdown
///
/// [`shutdown`](Self::shutdown) lets every worker finish its in-flight job
/// and discards whatever is still queued, unless the scheduler was configured
/// with [`ShutdownMode::Drain`].
///
/// # Example
///
/// ```rust
/// use priority_scheduler::prelude::*;
///
/// # fn main() -> Result<()> {
/// let scheduler = Scheduler::with_workers(2)?;
/// scheduler.start()?;
///
/// scheduler.execute_with_priority(|| {
///     println!("urgent");
///     Ok(())
/// }, Priority::High)?;
///
/// // Raw integers order consistently against the named levels
/// scheduler.execute_with_priority(|| Ok(()), 10)?;
///
/// scheduler.shutdown();
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
    queue: Arc<PriorityJobQueue>,
    pool: WorkerPool,
    sequence: AtomicU64,
    /// Held shared across a submission's check-and-push, exclusively by
    /// `start` and `shutdown`
    started: RwLock<bool>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pool", &self.pool)
            .field("started", &*self.started.read())
            .field("submitted", &self.sequence.load(Ordering::Relaxed))
            .finish()
    }
}

impl Scheduler {
    /// Create a scheduler with the default configuration (4 workers)
    pub fn new() -> Result<Self> {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with the given number of workers
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when `num_workers` is zero.
    pub fn with_workers(num_workers: usize) -> Result<Self> {
        Self::with_config(SchedulerConfig::new(num_workers))
    }

    /// Create a scheduler with a full configuration
    pub fn with_config(config: SchedulerConfig) -> Result<Self> {
        let queue = Arc::new(PriorityJobQueue::new());
        let pool = WorkerPool::with_config(config, Arc::clone(&queue))?;

        Ok(Self {
            queue,
            pool,
            sequence: AtomicU64::new(0),
            started: RwLock::new(false),
        })
    }

    /// Start the worker pool and begin accepting jobs
    ///
    /// Calling this on a started scheduler does nothing. A scheduler that was
    /// shut down can be started again; sequence numbers keep increasing.
    pub fn start(&self) -> Result<()> {
        let mut started = self.started.write();
        self.pool.start()?;
        *started = true;
        Ok(())
    }

    /// Submit a task at [`Priority::Medium`]
    ///
    /// Returns the sequence number assigned to the job.
    pub fn submit<T: Task + 'static>(&self, task: T) -> Result<u64> {
        self.submit_with_priority(task, Priority::Medium)
    }

    /// Submit a task with a specific priority.
    ///
    /// `priority` is either a [`Priority`] or any integer; larger runs first.
    /// The queue is unbounded, so this never blocks and never fails for
    /// capacity.
    ///
    /// # Errors
    ///
    /// Returns `NotStarted` if [`start`](Self::start) has not been called (or
    /// the scheduler has been shut down). Nothing is enqueued in that case.
    pub fn submit_with_priority<T: Task + 'static>(
        &self,
        task: T,
        priority: impl Into<i64>,
    ) -> Result<u64> {
        let started = self.started.read();
        if !*started {
            return Err(SchedulerError::not_started(
                &self.pool.config().thread_name_prefix,
            ));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::AcqRel);
        let job = Job::new(priority, sequence, Box::new(task));

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_submission(job.priority(), sequence);

        self.queue.push(job);
        drop(started);
        Ok(sequence)
    }

    /// Submit a task wrapped in the caller's current tracing span
    #[cfg(feature = "tracing")]
    pub fn submit_traced<T: Task + 'static>(
        &self,
        task: T,
        priority: impl Into<i64>,
    ) -> Result<u64> {
        self.submit_with_priority(crate::tracing::TracedTask::new(task), priority)
    }

    /// Submit a closure at [`Priority::Medium`]
    pub fn execute<F>(&self, f: F) -> Result<u64>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.submit(ClosureTask::new(f))
    }

    /// Submit a closure with a specific priority
    pub fn execute_with_priority<F>(&self, f: F, priority: impl Into<i64>) -> Result<u64>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.submit_with_priority(ClosureTask::new(f), priority)
    }

    /// Stop accepting jobs and stop the worker pool
    ///
    /// Blocks until every worker has finished its in-flight job and exited,
    /// or until the per-worker join timeout elapses. In the default
    /// [`ShutdownMode::Abandon`] the remaining backlog is then discarded
    /// without running, including jobs from submissions racing this call.
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        *self.started.write() = false;
        self.pool.stop();

        if self.pool.config().shutdown_mode == ShutdownMode::Abandon {
            let abandoned = self.queue.clear();
            if abandoned > 0 {
                #[cfg(feature = "tracing")]
                crate::tracing::metrics::record_backlog_abandoned(abandoned);
                #[cfg(not(feature = "tracing"))]
                log::info!("shutdown abandoned {} queued job(s)", abandoned);
            }
        }
    }

    /// Check if the scheduler accepts submissions
    pub fn is_started(&self) -> bool {
        *self.started.read()
    }

    /// Number of jobs accepted so far; also the next sequence number
    pub fn submitted_count(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Number of jobs waiting in the queue
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Get the configured number of workers
    pub fn num_workers(&self) -> usize {
        self.pool.num_workers()
    }

    /// The worker pool executing this scheduler's jobs
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Snapshot of submission and execution counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            jobs_submitted: self.submitted_count(),
            ..self.pool.snapshot()
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if *self.started.get_mut() || self.pool.is_running() {
            self.shutdown();
        }
    }
}
