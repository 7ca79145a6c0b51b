//! Lock-protected priority queue of jobs.

use crate::core::Job;
use parking_lot::{Condvar, Mutex};
use std::collections::BinaryHeap;
use std::time::Duration;

/// A thread-safe, unbounded priority queue of [`Job`]s.
///
/// Jobs are dequeued by their key `(-priority, sequence)`: highest priority
/// first, and within the same priority in submission order.
///
/// # Example
///
/// ```rust
/// use priority_scheduler::core::{ClosureTask, Job, Priority};
/// use priority_scheduler::queue::PriorityJobQueue;
///
/// let queue = PriorityJobQueue::new();
/// queue.push(Job::new(Priority::Low, 0, Box::new(ClosureTask::new(|| Ok(())))));
/// queue.push(Job::new(Priority::High, 1, Box::new(ClosureTask::new(|| Ok(())))));
///
/// assert_eq!(queue.try_pop().map(|job| job.sequence()), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct PriorityJobQueue {
    heap: Mutex<BinaryHeap<Job>>,
    condvar: Condvar,
}

impl PriorityJobQueue {
    /// Creates a new empty priority queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new priority queue with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::with_capacity(capacity)),
            condvar: Condvar::new(),
        }
    }

    /// Inserts a job and wakes one waiting worker. Never blocks on capacity.
    pub fn push(&self, job: Job) {
        self.heap.lock().push(job);
        self.condvar.notify_one();
    }

    /// Removes the next job without waiting.
    pub fn try_pop(&self) -> Option<Job> {
        self.heap.lock().pop()
    }

    /// Removes the next job, waiting at most `timeout` for one to arrive.
    ///
    /// Returns `None` when the wait elapses (or wakes spuriously) with the
    /// queue still empty.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Job> {
        let mut guard = self.heap.lock();

        if let Some(job) = guard.pop() {
            return Some(job);
        }

        let _ = self.condvar.wait_for(&mut guard, timeout);
        guard.pop()
    }

    /// Drops every queued job, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut guard = self.heap.lock();
        let discarded = guard.len();
        guard.clear();
        discarded
    }

    /// Number of jobs waiting in the queue
    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }
}
