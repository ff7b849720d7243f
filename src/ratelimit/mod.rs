//! Group-scoped fixed-window rate limiting.
//!
//! # Data Flow
//! ```text
//! matched route declares group
//!     → policy.rs (env → config → built-in table)
//!     → limiter.rs (skip if unlimited, map store failures to fail-open)
//!     → store.rs trait, backed by sqlite.rs (shared across processes)
//!       or memory.rs (single process)
//! ```
//!
//! # Design Decisions
//! - Windows are epoch-aligned: `floor(now_ms / window_ms)`
//! - Rollover is lazy; a counter from an older window reads as zero
//! - Rejected requests never increment the counter
//! - Lock wait is bounded by `LOCK_TIMEOUT`; on timeout the request is admitted

mod clock;
mod limiter;
mod memory;
mod policy;
mod sqlite;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{RateDecision, RateLimiter};
pub use memory::MemoryCounterStore;
pub use policy::{
    normalize_group, EnvSource, PolicyResolver, ProcessEnv, RatePolicy, DEFAULT_POLICIES,
};
pub use sqlite::SqliteCounterStore;
pub use store::{CounterStore, StoreError, WindowCounter, WindowOutcome, LOCK_TIMEOUT};
