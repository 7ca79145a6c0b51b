//! Tracing integration for observability.
//!
//! With the `tracing` feature enabled, workers and jobs run inside spans and
//! the pool emits the events in [`metrics`]. Without it, the same points are
//! reported through the `log` facade.
//!
//! # Example
//!
//! ```rust,ignore
//! use priority_scheduler::prelude::*;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("priority_scheduler=debug".parse().unwrap()))
//!     .init();
//!
//! let scheduler = Scheduler::with_workers(4)?;
//! scheduler.start()?;
//!
//! // Runs inside the span that was current when it was submitted
//! scheduler.submit_traced(MyTask::new(), Priority::High)?;
//! ```

use crate::core::{Result, Task};

/// A task wrapper that carries the submitter's tracing span to the worker.
///
/// The current span is captured when the wrapper is created and entered
/// while the inner task executes.
pub struct TracedTask<T: Task> {
    inner: T,
    #[cfg(feature = "tracing")]
    span: tracing::Span,
}

impl<T: Task> TracedTask<T> {
    /// Wraps `task`, capturing the current span.
    pub fn new(task: T) -> Self {
        Self {
            inner: task,
            #[cfg(feature = "tracing")]
            span: tracing::Span::current(),
        }
    }

    /// Wraps `task` with an explicit span.
    #[cfg(feature = "tracing")]
    pub fn with_span(task: T, span: tracing::Span) -> Self {
        Self { inner: task, span }
    }
}

impl<T: Task> Task for TracedTask<T> {
    fn execute(&mut self) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _guard = self.span.enter();
        self.inner.execute()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Events for metrics collection.
///
/// These are plain tracing events with `counter.`/`gauge.`/`histogram.`
/// field prefixes, suitable for a metrics-bridging subscriber layer.
#[cfg(feature = "tracing")]
pub mod metrics {
    use std::time::Duration;

    /// Records a job submission.
    #[inline]
    pub fn record_submission(priority: i64, sequence: u64) {
        tracing::trace!(
            counter.jobs_submitted = 1,
            priority = priority,
            sequence = sequence,
            "job submitted"
        );
    }

    /// Records job completion with timing.
    #[inline]
    pub fn record_completion(duration: Duration, success: bool) {
        let duration_ms = duration.as_millis() as u64;
        if success {
            tracing::trace!(
                counter.jobs_completed = 1,
                histogram.job_duration_ms = duration_ms,
                "job completed successfully"
            );
        } else {
            tracing::trace!(
                counter.jobs_failed = 1,
                histogram.job_duration_ms = duration_ms,
                "job failed"
            );
        }
    }

    /// Records a job panic.
    #[inline]
    pub fn record_panic(duration: Duration) {
        tracing::trace!(
            counter.jobs_panicked = 1,
            histogram.job_duration_ms = duration.as_millis() as u64,
            "job panicked"
        );
    }

    /// Records worker becoming busy.
    #[inline]
    pub fn record_worker_busy(worker_id: usize) {
        tracing::trace!(gauge.workers_busy = 1, worker_id = worker_id, "worker busy");
    }

    /// Records worker becoming idle.
    #[inline]
    pub fn record_worker_idle(worker_id: usize) {
        tracing::trace!(
            gauge.workers_busy = -1i64,
            worker_id = worker_id,
            "worker idle"
        );
    }

    /// Records pool startup.
    #[inline]
    pub fn record_pool_start(num_workers: usize) {
        tracing::info!(workers = num_workers, "worker pool started");
    }

    /// Records pool shutdown.
    #[inline]
    pub fn record_pool_shutdown(jobs_processed: u64, jobs_failed: u64) {
        tracing::info!(
            jobs_processed = jobs_processed,
            jobs_failed = jobs_failed,
            "worker pool shutdown complete"
        );
    }

    /// Records jobs discarded from the queue at shutdown.
    #[inline]
    pub fn record_backlog_abandoned(jobs: usize) {
        tracing::info!(counter.jobs_abandoned = jobs as u64, "backlog abandoned");
    }
}
