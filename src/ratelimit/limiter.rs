//! Group-scoped rate limiter.
//!
//! The bucket is the route group, not the caller: every client hitting an
//! AUTH route draws from the same AUTH budget.

use std::sync::Arc;

use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::policy::{PolicyResolver, RatePolicy};
use super::store::{CounterStore, StoreError};
use crate::observability::metrics;

/// Outcome of a limiter check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { count: u64 },
    Rejected { count: u64 },
    /// Policy has a zero max or window, or limiting is switched off.
    Unlimited,
    /// Lock not acquired within the store's timeout; admitted (fail-open).
    AllowedOnLockTimeout,
    /// Store failed for another reason; admitted (fail-open).
    AllowedOnStoreError,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, RateDecision::Rejected { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RateDecision::Allowed { .. } => "allowed",
            RateDecision::Rejected { .. } => "rejected",
            RateDecision::Unlimited => "unlimited",
            RateDecision::AllowedOnLockTimeout => "lock_timeout",
            RateDecision::AllowedOnStoreError => "store_error",
        }
    }
}

pub struct RateLimiter {
    resolver: PolicyResolver,
    store: Arc<dyn CounterStore>,
    clock: Arc<dyn Clock>,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(resolver: PolicyResolver, store: Arc<dyn CounterStore>) -> Self {
        Self {
            resolver,
            store,
            clock: Arc::new(SystemClock),
            enabled: true,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn policy(&self, group: &str) -> RatePolicy {
        self.resolver.resolve(group)
    }

    /// Resolve the group's policy and try to take one slot in the current window.
    pub async fn check(&self, group: &str) -> RateDecision {
        let policy = self.resolver.resolve(group);
        let decision = self.check_policy(&policy).await;
        metrics::record_rate_decision(&policy.group, decision.label());
        decision
    }

    /// Check against an already-resolved policy.
    pub async fn check_policy(&self, policy: &RatePolicy) -> RateDecision {
        if !self.enabled || policy.is_unlimited() {
            return RateDecision::Unlimited;
        }

        let now_ms = self.clock.now_ms();
        match self.store.check(policy, now_ms).await {
            Ok(outcome) if outcome.admitted => RateDecision::Allowed {
                count: outcome.count,
            },
            Ok(outcome) => {
                debug!(
                    group = %policy.group,
                    window_index = outcome.window_index,
                    count = outcome.count,
                    max = policy.max,
                    "Rate limit exceeded"
                );
                RateDecision::Rejected {
                    count: outcome.count,
                }
            }
            Err(StoreError::LockTimeout(group)) => {
                warn!(group = %group, "Counter lock timed out, admitting request");
                RateDecision::AllowedOnLockTimeout
            }
            Err(e) => {
                warn!(group = %policy.group, error = %e, "Counter store failed, admitting request");
                RateDecision::AllowedOnStoreError
            }
        }
    }

    /// Count recorded for the group's current window.
    pub async fn current_count(&self, group: &str) -> Result<u64, StoreError> {
        let policy = self.resolver.resolve(group);
        if policy.is_unlimited() {
            return Ok(0);
        }
        self.store.current(&policy, self.clock.now_ms()).await
    }
}
