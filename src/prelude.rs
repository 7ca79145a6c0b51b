//! Convenient re-exports for common types and traits

pub use crate::config::{FailurePolicy, SchedulerConfig, ShutdownMode};
pub use crate::core::{ClosureTask, Priority, Result, SchedulerError, Task};
pub use crate::pool::{PoolStats, WorkerPool};
pub use crate::scheduler::Scheduler;
