//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Where counters, users and maintenance state are persisted.
    pub storage: StorageConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Maintenance gate paths.
    pub maintenance: MaintenancePaths,

    /// Bearer credential settings.
    pub auth: AuthConfig,

    /// CORS preflight answers.
    pub cors: CorsConfig,

    /// Static asset passthrough.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Persistent storage locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one counter database per rate group.
    pub counter_dir: String,

    /// SQLite database holding the `users` and `maintenance_config` tables.
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            counter_dir: "data/rate".to_string(),
            database_path: "data/app.sqlite".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting. When disabled every grouped route is admitted.
    pub enabled: bool,

    /// Per-group limits keyed by group name. Environment overrides win over these.
    pub groups: BTreeMap<String, GroupLimitConfig>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            groups: BTreeMap::new(),
        }
    }
}

/// Limit for a single route group. Zero means "not configured".
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GroupLimitConfig {
    /// Maximum requests per window.
    pub max: u64,

    /// Window length in milliseconds.
    pub window_ms: u64,
}

/// Paths the maintenance gate treats specially.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MaintenancePaths {
    /// Everything under this prefix stays reachable during maintenance.
    pub admin_prefix: String,

    /// Health check path, always reachable.
    pub health_path: String,

    /// Maintenance status path, always reachable.
    pub status_path: String,

    /// Blocked paths under this prefix get JSON instead of the HTML page.
    pub api_prefix: String,
}

impl Default for MaintenancePaths {
    fn default() -> Self {
        Self {
            admin_prefix: "/api/admin".to_string(),
            health_path: "/api/health".to_string(),
            status_path: "/api/maintenance/status".to_string(),
            api_prefix: "/api/".to_string(),
        }
    }
}

/// Bearer credential configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to verify bearer tokens.
    /// Overridden by `GATEWAY_JWT_SECRET` when set.
    pub jwt_secret: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, PUT, PATCH, DELETE, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
            max_age_secs: 86_400,
        }
    }
}

/// Static asset passthrough configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve static files ahead of the admission pipeline.
    pub enabled: bool,

    /// Filesystem root; request paths are resolved beneath it.
    pub root: String,

    /// Path prefixes that are served from disk.
    pub prefixes: Vec<String>,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root: "public".to_string(),
            prefixes: vec!["/uploads/".to_string(), "/assets/".to_string()],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
