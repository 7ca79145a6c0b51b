//! The shared ordered queue between submitters and workers.
//!
//! A single [`PriorityJobQueue`] is owned by the [`Scheduler`] and handed to
//! its [`WorkerPool`] by `Arc`. It is the only structure touched by both
//! submitting threads and worker threads.
//!
//! [`Scheduler`]: crate::Scheduler
//! [`WorkerPool`]: crate::pool::WorkerPool

mod priority;

pub use priority::PriorityJobQueue;
