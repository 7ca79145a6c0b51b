//! Core types and traits for the scheduler

pub mod error;
pub mod job;
pub mod priority;

pub use error::{Result, SchedulerError};
pub use job::{BoxedTask, ClosureTask, Job, Task};
pub use priority::Priority;
