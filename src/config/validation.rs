//! Configuration validation.
//!
//! Serde handles syntax; this module checks the semantic rules and reports
//! every violation at once instead of stopping at the first.

use std::fmt;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::new("listener.bind_address", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::new(
            "auth.jwt_secret",
            "must be set (or provide GATEWAY_JWT_SECRET)",
        ));
    }

    if config.storage.counter_dir.trim().is_empty() {
        errors.push(ValidationError::new("storage.counter_dir", "must not be empty"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ValidationError::new("storage.database_path", "must not be empty"));
    }

    let paths = [
        ("maintenance.admin_prefix", &config.maintenance.admin_prefix),
        ("maintenance.health_path", &config.maintenance.health_path),
        ("maintenance.status_path", &config.maintenance.status_path),
        ("maintenance.api_prefix", &config.maintenance.api_prefix),
    ];
    for (field, value) in paths {
        if !value.starts_with('/') {
            errors.push(ValidationError::new(field, "must start with '/'"));
        }
    }

    if config.static_files.enabled {
        for prefix in &config.static_files.prefixes {
            if !prefix.starts_with('/') {
                errors.push(ValidationError::new(
                    "static_files.prefixes",
                    format!("'{}' must start with '/'", prefix),
                ));
            }
        }
    }

    for (group, limit) in &config.rate_limit.groups {
        if group.trim().is_empty() {
            errors.push(ValidationError::new("rate_limit.groups", "group name must not be empty"));
        }
        if limit.max > 0 && limit.window_ms == 0 {
            errors.push(ValidationError::new(
                format!("rate_limit.groups.{}", group),
                "max is set but window_ms is zero",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
