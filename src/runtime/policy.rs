use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const INITIAL_WAIT_MS: u64 = 120_000;
pub const POLL_INTERVAL_MS: u64 = 30_000;
pub const MAX_POLL_ATTEMPTS: u32 = 5;
pub const MIN_PROMPT_CHARS: usize = 10;

/// Fixed wait-then-retry schedule. This is the whole timeout policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Before the first status check
    pub initial_wait_ms: u64,
    /// Between two status checks. Never applied after the last attempt.
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_wait_ms: INITIAL_WAIT_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    pub fn initial_wait(&self) -> Duration {
        Duration::from_millis(self.initial_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Total simulated wait when every attempt comes back pending.
    pub fn worst_case_wait(&self) -> Duration {
        let gaps = self.max_attempts.saturating_sub(1);
        self.initial_wait() + self.poll_interval() * gaps
    }
}
