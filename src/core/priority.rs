//! Named priority levels
//!
//! Jobs are ordered by a plain `i64` priority. [`Priority`] names the three
//! common levels; any integer can be used alongside them for finer bands.

use serde::{Deserialize, Serialize};

/// Job priority levels (higher number = higher priority)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Background work
    Low = 1,
    /// Default for most work
    #[default]
    Medium = 2,
    /// Runs ahead of everything at lower levels
    High = 3,
}

impl Priority {
    /// Get the numeric value of the priority
    pub fn value(&self) -> i64 {
        *self as i64
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}
