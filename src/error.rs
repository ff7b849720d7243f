//! Error types for the gateway.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ratelimit::StoreError;
use crate::routing::RouteError;

/// Startup and infrastructure errors.
///
/// Nothing on the request path surfaces one of these to a client; the
/// admission pipeline maps every failure to a documented default instead.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// SQLite errors from the user or maintenance tables
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Rate counter store could not be opened
    #[error("Counter store error: {0}")]
    CounterStore(#[from] StoreError),

    /// Route table could not be built
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// A blocking storage task panicked or was cancelled
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics exporter errors
    #[error("Metrics error: {0}")]
    Metrics(String),
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
