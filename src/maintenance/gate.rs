//! Maintenance gate.
//!
//! Decided once per request, before the handler runs:
//! `Start → MaintenanceCheck → Allowed | Blocked`.
//!
//! A failed config read counts as "maintenance off" so a broken database
//! cannot take the whole site down by itself. The admin bypass goes the
//! other way: any failure there means "not admin".

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{debug, warn};

use super::store::{MaintenanceConfig, MaintenanceSource};
use crate::admin::auth::AdminIdentityCheck;
use crate::config::MaintenancePaths;

/// Why a request got through while maintenance is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    AdminPath,
    HealthCheck,
    StatusCheck,
    AdminIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Maintenance is off (or its state could not be read).
    Open,
    Allowed(AllowReason),
    Blocked { message: String, api: bool },
}

impl GateDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GateDecision::Blocked { .. })
    }
}

pub struct MaintenanceGate {
    source: Arc<dyn MaintenanceSource>,
    admin: Arc<AdminIdentityCheck>,
    paths: MaintenancePaths,
}

impl MaintenanceGate {
    pub fn new(
        source: Arc<dyn MaintenanceSource>,
        admin: Arc<AdminIdentityCheck>,
        paths: MaintenancePaths,
    ) -> Self {
        Self {
            source,
            admin,
            paths,
        }
    }

    /// Current config, or the disabled default if it cannot be read.
    pub async fn current(&self) -> MaintenanceConfig {
        match self.source.load().await {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to read maintenance config, treating as disabled");
                MaintenanceConfig::default()
            }
        }
    }

    pub fn is_api_path(&self, path: &str) -> bool {
        path.starts_with(&self.paths.api_prefix)
    }

    fn under_admin_prefix(&self, path: &str) -> bool {
        let prefix = self.paths.admin_prefix.trim_end_matches('/');
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub async fn evaluate(&self, path: &str, headers: &HeaderMap) -> GateDecision {
        let config = self.current().await;
        if !config.enabled {
            return GateDecision::Open;
        }

        let reason = if self.under_admin_prefix(path) {
            Some(AllowReason::AdminPath)
        } else if path == self.paths.health_path {
            Some(AllowReason::HealthCheck)
        } else if path == self.paths.status_path {
            Some(AllowReason::StatusCheck)
        } else if self.admin.is_admin_request(headers).await {
            Some(AllowReason::AdminIdentity)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(path = %path, reason = ?reason, "Allowed through maintenance");
                GateDecision::Allowed(reason)
            }
            None => {
                debug!(path = %path, "Blocked by maintenance");
                GateDecision::Blocked {
                    message: config.message,
                    api: self.is_api_path(path),
                }
            }
        }
    }
}
