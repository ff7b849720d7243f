//! Persisted maintenance switch.
//!
//! Read on every request, never cached. Written by the admin config endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const READ_TIMEOUT: Duration = Duration::from_millis(250);

pub const DEFAULT_MESSAGE: &str =
    "We are performing scheduled maintenance. Please check back soon.";

/// Global maintenance switch and the message shown while it is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    pub enabled: bool,
    pub message: String,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

#[async_trait]
pub trait MaintenanceSource: Send + Sync {
    async fn load(&self) -> Result<MaintenanceConfig>;

    async fn store(&self, config: &MaintenanceConfig) -> Result<()>;
}

/// Single-row table `maintenance_config` (id = 1).
#[derive(Debug, Clone)]
pub struct SqliteMaintenanceStore {
    path: PathBuf,
}

impl SqliteMaintenanceStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(READ_TIMEOUT)?;
        Ok(conn)
    }

    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS maintenance_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                enabled INTEGER NOT NULL DEFAULT 0,
                message TEXT NOT NULL DEFAULT ''
            )",
        )?;
        Ok(())
    }
}

#[async_trait]
impl MaintenanceSource for SqliteMaintenanceStore {
    async fn load(&self) -> Result<MaintenanceConfig> {
        let store = self.clone();
        let config = tokio::task::spawn_blocking(move || -> Result<MaintenanceConfig> {
            let conn = store.connect()?;
            let row = conn
                .query_row(
                    "SELECT enabled, message FROM maintenance_config WHERE id = 1",
                    [],
                    |row| Ok((row.get::<_, bool>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?;

            Ok(match row {
                Some((enabled, message)) => MaintenanceConfig {
                    enabled,
                    message: if message.trim().is_empty() {
                        DEFAULT_MESSAGE.to_string()
                    } else {
                        message
                    },
                },
                None => MaintenanceConfig::default(),
            })
        })
        .await??;
        Ok(config)
    }

    async fn store(&self, config: &MaintenanceConfig) -> Result<()> {
        let store = self.clone();
        let config = config.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = store.connect()?;
            conn.execute(
                "INSERT INTO maintenance_config (id, enabled, message) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET enabled = excluded.enabled, message = excluded.message",
                params![config.enabled, config.message],
            )?;
            Ok(())
        })
        .await??;
        Ok(())
    }
}
