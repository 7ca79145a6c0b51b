//! Task trait and the scheduled job record

use crate::core::error::{Result, SchedulerError};
use std::cmp::{Ordering, Reverse};
use std::fmt;

/// A unit of work to be executed by the scheduler
///
/// Arguments are captured by the implementing type, so the scheduler only
/// ever invokes it with no further input.
pub trait Task: Send {
    /// Execute the task
    ///
    /// # Errors
    ///
    /// Returns an error if the work fails
    fn execute(&mut self) -> Result<()>;

    /// Get the task's name for debugging and logging
    fn name(&self) -> &str {
        "Task"
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.name())
    }
}

/// A boxed task that can be sent across threads
pub type BoxedTask = Box<dyn Task>;

/// Helper to create a task from a closure
pub struct ClosureTask<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    closure: Option<F>,
    name: String,
}

impl<F> ClosureTask<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    /// Create a new closure task
    pub fn new(closure: F) -> Self {
        Self {
            closure: Some(closure),
            name: "ClosureTask".to_string(),
        }
    }

    /// Create a new closure task with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure: Some(closure),
            name: name.into(),
        }
    }
}

impl<F> Task for ClosureTask<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    fn execute(&mut self) -> Result<()> {
        match self.closure.take() {
            Some(closure) => closure(),
            None => Err(SchedulerError::already_executed(&self.name)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One scheduled unit of work: priority, task and submission sequence
///
/// Jobs order by the key `(-priority, sequence)`: the smallest key is the
/// next one to run. The `Ord` impl is inverted so that `BinaryHeap` (a
/// max-heap) pops the smallest key first.
pub struct Job {
    priority: i64,
    sequence: u64,
    task: BoxedTask,
}

impl Job {
    /// Create a new job
    pub fn new(priority: impl Into<i64>, sequence: u64, task: BoxedTask) -> Self {
        Self {
            priority: priority.into(),
            sequence,
            task,
        }
    }

    /// Get the priority of this job
    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Get the sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Get the task name
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Ordering key; smaller runs first
    pub fn key(&self) -> (Reverse<i64>, u64) {
        (Reverse(self.priority), self.sequence)
    }

    /// Run the task, consuming the job
    ///
    /// Failures from the task are returned unchanged.
    pub fn run(mut self) -> Result<()> {
        self.task.execute()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("task", &self.task.name())
            .finish()
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Priority;
    use std::collections::BinaryHeap;

    fn noop(priority: impl Into<i64>, sequence: u64) -> Job {
        Job::new(priority, sequence, Box::new(ClosureTask::new(|| Ok(()))))
    }

    #[test]
    fn test_closure_task() {
        let mut task = ClosureTask::new(|| Ok(()));

        assert_eq!(task.name(), "ClosureTask");
        assert!(task.execute().is_ok());
        assert!(matches!(
            task.execute(),
            Err(SchedulerError::TaskAlreadyExecuted { .. })
        ));
    }

    #[test]
    fn test_closure_task_with_name() {
        let task = ClosureTask::with_name(|| Ok(()), "TestTask");
        assert_eq!(task.name(), "TestTask");
    }

    #[test]
    fn test_job_run_propagates_failure() {
        let job = Job::new(
            Priority::Medium,
            0,
            Box::new(ClosureTask::new(|| Err(SchedulerError::other("boom")))),
        );
        let err = job.run().unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_job_ordering_by_priority_then_sequence() {
        let mut heap = BinaryHeap::new();
        heap.push(noop(Priority::Low, 0));
        heap.push(noop(Priority::High, 1));
        heap.push(noop(Priority::Medium, 2));
        heap.push(noop(Priority::High, 3));
        heap.push(noop(10, 4));

        let order: Vec<(i64, u64)> = std::iter::from_fn(|| heap.pop())
            .map(|j| (j.priority(), j.sequence()))
            .collect();
        assert_eq!(order, vec![(10, 4), (3, 1), (3, 3), (2, 2), (1, 0)]);
    }

    #[test]
    fn test_extreme_priorities_do_not_overflow() {
        let min = noop(i64::MIN, 0);
        let max = noop(i64::MAX, 1);
        assert!(max > min);
        assert!(max.key() < min.key());
    }
}
