//! Worker thread implementation

use crate::config::{FailurePolicy, SchedulerConfig, ShutdownMode};
use crate::core::{Job, Result, SchedulerError};
use crate::queue::PriorityJobQueue;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use tracing::{debug, span, Level};

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of jobs that completed successfully
    pub jobs_processed: AtomicU64,
    /// Total number of jobs that returned an error
    pub jobs_failed: AtomicU64,
    /// Total number of jobs that panicked
    pub jobs_panicked: AtomicU64,
    /// Time spent running jobs of any outcome (microseconds)
    pub busy_time_us: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment jobs processed counter
    pub fn increment_processed(&self) {
        self.jobs_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment jobs failed counter
    pub fn increment_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment jobs panicked counter
    pub fn increment_panicked(&self) {
        self.jobs_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Add time spent running a job
    pub fn add_busy_time(&self, microseconds: u64) {
        self.busy_time_us.fetch_add(microseconds, Ordering::Relaxed);
    }

    /// Get total jobs processed
    pub fn get_jobs_processed(&self) -> u64 {
        self.jobs_processed.load(Ordering::Relaxed)
    }

    /// Get total jobs failed
    pub fn get_jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    /// Get total jobs panicked
    pub fn get_jobs_panicked(&self) -> u64 {
        self.jobs_panicked.load(Ordering::Relaxed)
    }

    /// Get total busy time in microseconds
    pub fn get_busy_time_us(&self) -> u64 {
        self.busy_time_us.load(Ordering::Relaxed)
    }
}

/// Per-worker settings copied out of [`SchedulerConfig`]
#[derive(Debug, Clone, Copy)]
struct LoopSettings {
    poll_interval: Duration,
    failure_policy: FailurePolicy,
    shutdown_mode: ShutdownMode,
}

/// A worker thread that pulls jobs from the shared queue until told to stop
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier for this worker within its pool
    /// * `queue` - Queue shared with the scheduler
    /// * `shutdown` - Stop signal of the pool run this worker belongs to,
    ///   checked before every dequeue
    /// * `config` - Poll interval, failure policy and shutdown mode
    pub fn new(
        id: usize,
        queue: Arc<PriorityJobQueue>,
        shutdown: Arc<AtomicBool>,
        config: &SchedulerConfig,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);
        let settings = LoopSettings {
            poll_interval: config.poll_interval,
            failure_policy: config.failure_policy,
            shutdown_mode: config.shutdown_mode,
        };

        let thread = thread::Builder::new()
            .name(format!("{}-{}", config.thread_name_prefix, id))
            .spawn(move || {
                Self::run(id, queue, shutdown, stats_clone, settings);
            })
            .map_err(|e| SchedulerError::spawn_with_source(id, e.to_string(), e))?;

        Ok(Self {
            id,
            thread: Some(thread),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Whether the worker thread is still running
    pub fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Wait up to `timeout` for the worker thread to exit.
    ///
    /// Returns `false` if the thread was still running when the timeout
    /// elapsed; it is then detached and left to finish on its own.
    pub fn join_timeout(mut self, timeout: Duration) -> bool {
        let Some(thread) = self.thread.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if thread.is_finished() {
                if thread.join().is_err() {
                    log::error!("worker {} exited by panic", self.id);
                }
                return true;
            }

            if start.elapsed() >= timeout {
                log::warn!(
                    "worker {} did not finish within {}ms; detaching it",
                    self.id,
                    timeout.as_millis()
                );
                return false;
            }

            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Main worker loop
    ///
    /// Each iteration checks the shutdown signal first, then waits at most
    /// one poll interval for a job.
    fn run(
        id: usize,
        queue: Arc<PriorityJobQueue>,
        shutdown: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
        settings: LoopSettings,
    ) {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        #[cfg(feature = "tracing")]
        debug!("worker started");
        #[cfg(not(feature = "tracing"))]
        log::debug!("worker {} started", id);

        loop {
            let job = if shutdown.load(Ordering::Acquire) {
                match settings.shutdown_mode {
                    ShutdownMode::Abandon => break,
                    ShutdownMode::Drain => match queue.try_pop() {
                        Some(job) => job,
                        None => break,
                    },
                }
            } else {
                match queue.pop_timeout(settings.poll_interval) {
                    Some(job) => job,
                    None => continue,
                }
            };

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_worker_busy(id);

            let succeeded = Self::execute_job(id, job, &stats);

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_worker_idle(id);

            if !succeeded && settings.failure_policy == FailurePolicy::TerminateWorker {
                #[cfg(feature = "tracing")]
                tracing::warn!("worker terminating after failed job");
                #[cfg(not(feature = "tracing"))]
                log::warn!("worker {} terminating after failed job", id);
                return;
            }
        }

        #[cfg(feature = "tracing")]
        debug!(
            jobs_processed = stats.get_jobs_processed(),
            jobs_failed = stats.get_jobs_failed(),
            "worker shutting down"
        );
        #[cfg(not(feature = "tracing"))]
        log::debug!(
            "worker {} shutting down ({} processed, {} failed)",
            id,
            stats.get_jobs_processed(),
            stats.get_jobs_failed()
        );
    }

    /// Execute a single job with panic protection.
    ///
    /// Returns `true` when the job completed successfully.
    #[allow(unused_variables)]
    fn execute_job(id: usize, job: Job, stats: &WorkerStats) -> bool {
        let sequence = job.sequence();

        #[cfg(feature = "tracing")]
        let job_span = span!(
            Level::DEBUG,
            "job_execution",
            task = job.name(),
            priority = job.priority(),
            sequence = sequence
        );
        #[cfg(feature = "tracing")]
        let _job_guard = job_span.enter();

        let start = Instant::now();
        let panic_result = catch_unwind(AssertUnwindSafe(move || job.run()));
        let elapsed = start.elapsed();

        stats.add_busy_time(elapsed.as_micros() as u64);

        match panic_result {
            Ok(Ok(())) => {
                stats.increment_processed();
                #[cfg(feature = "tracing")]
                {
                    debug!(duration_ms = elapsed.as_millis() as u64, "job completed");
                    crate::tracing::metrics::record_completion(elapsed, true);
                }
                true
            }
            Ok(Err(e)) => {
                stats.increment_failed();
                #[cfg(feature = "tracing")]
                {
                    tracing::warn!(
                        error = %e,
                        duration_ms = elapsed.as_millis() as u64,
                        "job failed"
                    );
                    crate::tracing::metrics::record_completion(elapsed, false);
                }
                #[cfg(not(feature = "tracing"))]
                log::warn!("worker {}: job {} failed: {}", id, sequence, e);
                false
            }
            Err(panic_info) => {
                stats.increment_panicked();
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                #[cfg(feature = "tracing")]
                {
                    tracing::error!(
                        panic_message = %panic_msg,
                        duration_ms = elapsed.as_millis() as u64,
                        "job panicked"
                    );
                    crate::tracing::metrics::record_panic(elapsed);
                }
                #[cfg(not(feature = "tracing"))]
                log::error!("worker {}: job {} panicked: {}", id, sequence, panic_msg);
                false
            }
        }
    }
}
