//! Rate counter storage.
//!
//! One counter per route group. The counter remembers which fixed window it
//! belongs to; a counter from an older window reads as zero, so rollover
//! needs no sweeper.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::policy::RatePolicy;

/// How long a check may wait for the group's exclusive lock before the
/// limiter gives up and admits the request (fail-open).
pub const LOCK_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum StoreError {
    /// The group's lock was not acquired within [`LOCK_TIMEOUT`].
    #[error("Timed out waiting for counter lock on group {0}")]
    LockTimeout(String),

    #[error("Counter storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

/// Persisted counter for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCounter {
    pub window_index: i64,
    pub count: u64,
}

impl WindowCounter {
    pub fn new(window_index: i64) -> Self {
        Self {
            window_index,
            count: 0,
        }
    }

    /// Count as seen from `window_index`.
    pub fn count_in(&self, window_index: i64) -> u64 {
        if self.window_index == window_index {
            self.count
        } else {
            0
        }
    }

    /// Admit one request if the window has room. Rejections leave the count
    /// untouched.
    ///
    /// The counter only moves forward. A caller whose clock reading belongs
    /// to an older window than the stored one (it read the clock, then waited
    /// for the lock across a boundary) is judged against the stored window.
    pub fn admit(&mut self, window_index: i64, max: u64) -> bool {
        if window_index > self.window_index {
            self.window_index = window_index;
            self.count = 0;
        }
        if self.count >= max {
            return false;
        }
        self.count += 1;
        true
    }
}

/// Result of a single check-and-increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOutcome {
    pub admitted: bool,
    /// Window the request was counted against.
    pub window_index: i64,
    /// Count after the check (unchanged on rejection).
    pub count: u64,
}

/// Shared storage for group counters.
///
/// `check` must be atomic per group: concurrent callers observe some serial
/// order of increments, and the stored count always equals the number of
/// admitted calls in that window.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn check(&self, policy: &RatePolicy, now_ms: i64) -> Result<WindowOutcome, StoreError>;

    /// Current count for the policy's group in the window containing `now_ms`.
    async fn current(&self, policy: &RatePolicy, now_ms: i64) -> Result<u64, StoreError>;
}
