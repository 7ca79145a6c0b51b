//! Error types for the scheduler

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors that can occur in the scheduler
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SchedulerError {
    /// Submission attempted before the scheduler was started
    #[error("Scheduler '{scheduler}' is not started; call start() first")]
    NotStarted {
        /// Name of the scheduler (its worker thread prefix)
        scheduler: String,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{worker_id}: {message}")]
    SpawnError {
        /// ID of the worker that failed to spawn
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Job body reported a failure
    #[error("Job execution failed (sequence: {sequence}): {message}")]
    ExecutionError {
        /// Sequence number of the failed job
        sequence: u64,
        /// Error message
        message: String,
    },

    /// A one-shot task was invoked a second time
    #[error("Task '{name}' already executed - cannot execute twice")]
    TaskAlreadyExecuted {
        /// Name of the task
        name: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl SchedulerError {
    /// Create a not started error
    pub fn not_started(scheduler: impl Into<String>) -> Self {
        SchedulerError::NotStarted {
            scheduler: scheduler.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        SchedulerError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        SchedulerError::SpawnError {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an execution error
    pub fn execution(sequence: u64, message: impl Into<String>) -> Self {
        SchedulerError::ExecutionError {
            sequence,
            message: message.into(),
        }
    }

    /// Create an already executed error
    pub fn already_executed(name: impl Into<String>) -> Self {
        SchedulerError::TaskAlreadyExecuted { name: name.into() }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SchedulerError::Other(msg.into())
    }

    /// Whether this error is the invalid-state error raised by an early submit
    pub fn is_not_started(&self) -> bool {
        matches!(self, SchedulerError::NotStarted { .. })
    }

    /// Whether this error is the invalid-argument error raised by configuration
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, SchedulerError::InvalidConfig { .. })
    }
}
