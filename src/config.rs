//! Scheduler and worker pool configuration

use crate::core::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of worker threads
pub const DEFAULT_NUM_WORKERS: usize = 4;

/// What a worker does after a job returns an error or panics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and count the failure, then keep serving jobs
    #[default]
    Isolate,
    /// Log and count the failure, then end the worker thread.
    ///
    /// The pool runs one worker short until the next stop/start cycle.
    TerminateWorker,
}

/// What happens to queued jobs when the pool is stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownMode {
    /// Workers finish their in-flight job and exit; the backlog is discarded
    #[default]
    Abandon,
    /// Workers keep taking jobs until the queue is empty, then exit
    Drain,
}

/// Configuration for the scheduler and its worker pool
///
/// Every field has a default, so a partial JSON or TOML document is enough:
///
/// ```rust
/// use priority_scheduler::SchedulerConfig;
///
/// let config: SchedulerConfig = serde_json::from_str(r#"{ "num_workers": 2 }"#).unwrap();
/// assert_eq!(config.num_workers, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of worker threads; must be at least 1
    pub num_workers: usize,
    /// How long a worker waits on an empty queue before re-checking the
    /// shutdown signal. Default: 100ms
    pub poll_interval: Duration,
    /// How long `stop` waits for each worker to exit. Default: 5s
    pub join_timeout: Duration,
    /// Worker thread name prefix
    pub thread_name_prefix: String,
    /// Worker behaviour after a failed job
    pub failure_policy: FailurePolicy,
    /// Fate of queued jobs on shutdown
    pub shutdown_mode: ShutdownMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            poll_interval: Duration::from_millis(100),
            join_timeout: Duration::from_secs(5),
            thread_name_prefix: "worker".to_string(),
            failure_policy: FailurePolicy::default(),
            shutdown_mode: ShutdownMode::default(),
        }
    }
}

impl SchedulerConfig {
    /// Create a new configuration with specified number of workers
    #[must_use]
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    /// Set the worker poll interval.
    ///
    /// Shorter intervals shorten shutdown latency at the cost of more wakeups.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-worker join timeout used by `stop`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the failure policy
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the shutdown mode
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shutdown_mode(mut self, mode: ShutdownMode) -> Self {
        self.shutdown_mode = mode;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(SchedulerError::invalid_config(
                "num_workers",
                "Number of workers must be greater than 0",
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(SchedulerError::invalid_config(
                "poll_interval",
                "Poll interval must be non-zero",
            ));
        }
        if self.join_timeout.is_zero() {
            return Err(SchedulerError::invalid_config(
                "join_timeout",
                "Join timeout must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.join_timeout, Duration::from_secs(5));
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert_eq!(config.shutdown_mode, ShutdownMode::Abandon);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SchedulerConfig::new(2)
            .with_poll_interval(Duration::from_millis(10))
            .with_join_timeout(Duration::from_secs(1))
            .with_thread_name_prefix("render")
            .with_failure_policy(FailurePolicy::TerminateWorker)
            .with_shutdown_mode(ShutdownMode::Drain);

        assert_eq!(config.num_workers, 2);
        assert_eq!(config.thread_name_prefix, "render");
        assert_eq!(config.failure_policy, FailurePolicy::TerminateWorker);
        assert_eq!(config.shutdown_mode, ShutdownMode::Drain);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = SchedulerConfig::new(0).validate().unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvalidConfig { ref parameter, .. } if parameter == "num_workers"
        ));
    }

    #[test]
    fn test_zero_durations_rejected() {
        let err = SchedulerConfig::new(1)
            .with_poll_interval(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_config());

        let err = SchedulerConfig::new(1)
            .with_join_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_partial_json() {
        let config: SchedulerConfig = serde_json::from_str(
            r#"{ "num_workers": 8, "failure_policy": "terminate_worker", "shutdown_mode": "drain" }"#,
        )
        .unwrap();

        assert_eq!(config.num_workers, 8);
        assert_eq!(config.failure_policy, FailurePolicy::TerminateWorker);
        assert_eq!(config.shutdown_mode, ShutdownMode::Drain);
        assert_eq!(config.thread_name_prefix, "worker");
    }
}
