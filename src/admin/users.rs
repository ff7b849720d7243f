//! User record lookup.
//!
//! The `users` table belongs to the application schema; the gateway only
//! reads `id`, `email` and `is_admin` from it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Lookups are bounded; a slow database means "not admin", not a hung request.
const LOOKUP_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>>;
}

#[derive(Debug, Clone)]
pub struct SqliteUserDirectory {
    path: PathBuf,
}

impl SqliteUserDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(LOOKUP_TIMEOUT)?;
        Ok(conn)
    }

    /// Create the `users` table if the application has not done so yet.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                is_admin INTEGER NOT NULL DEFAULT 0
            )",
        )?;
        Ok(())
    }

    /// Insert or replace a user row. Used for seeding and tests.
    pub fn upsert(&self, user: &UserRecord) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO users (id, email, is_admin) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET email = excluded.email, is_admin = excluded.is_admin",
            params![user.id, user.email, user.is_admin],
        )?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        let directory = self.clone();
        let record = tokio::task::spawn_blocking(move || -> Result<Option<UserRecord>> {
            let conn = directory.connect()?;
            let record = conn
                .query_row(
                    "SELECT id, email, is_admin FROM users WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(UserRecord {
                            id: row.get(0)?,
                            email: row.get(1)?,
                            is_admin: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(record)
        })
        .await??;
        Ok(record)
    }
}
