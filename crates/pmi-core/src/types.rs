//! Common types used across the analysis pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for retry behavior
///
/// Only transient failures (connection errors and timeouts) are retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryConfig {
    /// A single attempt, no retry
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(1),
        }
    }
}
