//! Durable counter store shared by every gateway process on the host.
//!
//! Each group lives in its own SQLite file under the counter directory, so
//! the database write lock is scoped to that group. A check runs inside a
//! `BEGIN IMMEDIATE` transaction; SQLite's busy timeout is the lock-wait
//! bound, and a busy database surfaces as [`StoreError::LockTimeout`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use tracing::trace;

use super::policy::RatePolicy;
use super::store::{CounterStore, StoreError, WindowCounter, WindowOutcome, LOCK_TIMEOUT};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS rate_window (
    grp TEXT PRIMARY KEY,
    window_index INTEGER NOT NULL,
    count INTEGER NOT NULL
)";

#[derive(Debug, Clone)]
pub struct SqliteCounterStore {
    dir: PathBuf,
    lock_timeout: Duration,
    /// Group files whose table this handle has already created.
    schema_ready: Arc<DashSet<PathBuf>>,
}

impl SqliteCounterStore {
    /// Open (and create if needed) the counter directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock_timeout: LOCK_TIMEOUT,
            schema_ready: Arc::new(DashSet::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, group: &str) -> PathBuf {
        self.dir.join(format!("{}.sqlite", file_stem(group)))
    }

    fn connect(
        path: &Path,
        lock_timeout: Duration,
        schema_ready: &DashSet<PathBuf>,
    ) -> Result<Connection, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(lock_timeout)?;
        if !schema_ready.contains(path) {
            conn.execute_batch(SCHEMA)?;
            schema_ready.insert(path.to_path_buf());
        }
        Ok(conn)
    }
}

/// Maps a group label onto a safe file name.
fn file_stem(group: &str) -> String {
    let stem: String = group
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}

fn classify(err: rusqlite::Error, group: &str) -> StoreError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            StoreError::LockTimeout(group.to_string())
        }
        _ => StoreError::from(err),
    }
}

fn check_blocking(
    store: &SqliteCounterStore,
    path: &Path,
    policy: &RatePolicy,
    now_ms: i64,
) -> Result<WindowOutcome, rusqlite::Error> {
    let window_index = policy.window_index(now_ms);
    let mut conn = SqliteCounterStore::connect(path, store.lock_timeout, &store.schema_ready)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let stored = tx
        .query_row(
            "SELECT window_index, count FROM rate_window WHERE grp = ?1",
            params![policy.group],
            |row| {
                Ok(WindowCounter {
                    window_index: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            },
        )
        .optional()?;

    let mut counter = stored.unwrap_or_else(|| WindowCounter::new(window_index));
    let admitted = counter.admit(window_index, policy.max);

    if admitted {
        tx.execute(
            "INSERT INTO rate_window (grp, window_index, count) VALUES (?1, ?2, ?3)
             ON CONFLICT(grp) DO UPDATE SET window_index = excluded.window_index,
                                            count = excluded.count",
            params![policy.group, counter.window_index, counter.count as i64],
        )?;
        tx.commit()?;
    }
    // Rejections roll back: nothing to persist.

    Ok(WindowOutcome {
        admitted,
        window_index: counter.window_index,
        count: counter.count,
    })
}

fn current_blocking(
    store: &SqliteCounterStore,
    path: &Path,
    policy: &RatePolicy,
    now_ms: i64,
) -> Result<u64, rusqlite::Error> {
    if !path.exists() {
        return Ok(0);
    }
    let conn = SqliteCounterStore::connect(path, store.lock_timeout, &store.schema_ready)?;
    let stored = conn
        .query_row(
            "SELECT window_index, count FROM rate_window WHERE grp = ?1",
            params![policy.group],
            |row| {
                Ok(WindowCounter {
                    window_index: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            },
        )
        .optional()?;
    Ok(stored
        .map(|c| c.count_in(policy.window_index(now_ms)))
        .unwrap_or(0))
}

#[async_trait]
impl CounterStore for SqliteCounterStore {
    async fn check(&self, policy: &RatePolicy, now_ms: i64) -> Result<WindowOutcome, StoreError> {
        let path = self.path_for(&policy.group);
        let store = self.clone();
        let owned = policy.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            check_blocking(&store, &path, &owned, now_ms)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
        .map_err(|e| classify(e, &policy.group))?;

        trace!(
            group = %policy.group,
            window_index = outcome.window_index,
            count = outcome.count,
            admitted = outcome.admitted,
            "Counter checked"
        );
        Ok(outcome)
    }

    async fn current(&self, policy: &RatePolicy, now_ms: i64) -> Result<u64, StoreError> {
        let path = self.path_for(&policy.group);
        let store = self.clone();
        let owned = policy.clone();

        tokio::task::spawn_blocking(move || current_blocking(&store, &path, &owned, now_ms))
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?
            .map_err(|e| classify(e, &policy.group))
    }
}
