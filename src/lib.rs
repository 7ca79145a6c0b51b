//! # Priority Scheduler
//!
//! An in-process job scheduler: callers submit work tagged with a priority and
//! a fixed pool of worker threads runs it, highest priority first and
//! first-come-first-served among equal priorities.
//!
//! ## Features
//!
//! - **Priority ordering**: jobs are keyed by `(-priority, sequence)`; named
//!   levels ([`Priority`]) and raw integers mix freely
//! - **Fixed worker pool**: N threads polling a shared, lock-protected heap
//! - **Bounded shutdown**: in-flight jobs finish, the backlog is abandoned
//!   (or drained, if configured), joins are bounded by a timeout
//! - **Failure isolation**: failed or panicking jobs are logged and counted;
//!   optionally they retire the worker that ran them
//! - **Observability**: `log` facade by default, `tracing` spans and metric
//!   events behind the `tracing` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use priority_scheduler::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let scheduler = Scheduler::with_workers(4)?;
//! scheduler.start()?;
//!
//! for i in 0..10 {
//!     scheduler.execute(move || {
//!         println!("Job {} executing", i);
//!         Ok(())
//!     })?;
//! }
//! scheduler.execute_with_priority(|| Ok(()), Priority::High)?;
//!
//! scheduler.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Tasks
//!
//! ```rust
//! use priority_scheduler::prelude::*;
//!
//! struct Resize {
//!     width: u32,
//! }
//!
//! impl Task for Resize {
//!     fn execute(&mut self) -> Result<()> {
//!         println!("Resizing to {}", self.width);
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Resize"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! # let scheduler = Scheduler::with_workers(1)?;
//! # scheduler.start()?;
//! scheduler.submit_with_priority(Resize { width: 640 }, Priority::Low)?;
//! # scheduler.shutdown();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod scheduler;
pub mod tracing;

pub use crate::config::{FailurePolicy, SchedulerConfig, ShutdownMode};
pub use crate::core::{BoxedTask, ClosureTask, Job, Priority, Result, SchedulerError, Task};
pub use crate::pool::{PoolStats, WorkerPool, WorkerStats};
pub use crate::scheduler::Scheduler;
