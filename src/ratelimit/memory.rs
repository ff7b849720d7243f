//! In-process counter store.
//!
//! Each group gets its own async mutex so unrelated groups never wait on
//! each other and a contended group parks the task instead of the worker
//! thread. Only suitable when a single gateway process owns the counters.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};

use super::policy::RatePolicy;
use super::store::{CounterStore, StoreError, WindowCounter, WindowOutcome, LOCK_TIMEOUT};

pub struct MemoryCounterStore {
    counters: DashMap<String, Arc<Mutex<WindowCounter>>>,
    lock_timeout: Duration,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
            lock_timeout: LOCK_TIMEOUT,
        }
    }

    fn slot(&self, group: &str, window_index: i64) -> Arc<Mutex<WindowCounter>> {
        // Clone the Arc out so the shard lock is released before we wait on
        // the group mutex.
        self.counters
            .entry(group.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(WindowCounter::new(window_index))))
            .clone()
    }

    async fn lock<'a>(
        &self,
        slot: &'a Mutex<WindowCounter>,
        group: &str,
    ) -> Result<MutexGuard<'a, WindowCounter>, StoreError> {
        tokio::time::timeout(self.lock_timeout, slot.lock())
            .await
            .map_err(|_| StoreError::LockTimeout(group.to_string()))
    }

    /// Number of groups that have seen traffic.
    pub fn group_count(&self) -> usize {
        self.counters.len()
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn check(&self, policy: &RatePolicy, now_ms: i64) -> Result<WindowOutcome, StoreError> {
        let window_index = policy.window_index(now_ms);
        let slot = self.slot(&policy.group, window_index);

        let mut counter = self.lock(&slot, &policy.group).await?;

        let admitted = counter.admit(window_index, policy.max);
        Ok(WindowOutcome {
            admitted,
            window_index: counter.window_index,
            count: counter.count,
        })
    }

    async fn current(&self, policy: &RatePolicy, now_ms: i64) -> Result<u64, StoreError> {
        let window_index = policy.window_index(now_ms);
        let Some(slot) = self.counters.get(&policy.group).map(|s| s.clone()) else {
            return Ok(0);
        };
        let counter = self.lock(&slot, &policy.group).await?;
        Ok(counter.count_in(window_index))
    }
}
