use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::auth::{AdminCheck, AdminIdentity};
use super::AdminServices;
use crate::http::response::{json_error, Rejection};
use crate::maintenance::MaintenanceConfig;
use crate::routing::RouteRequest;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Serialize)]
pub struct ConfigView {
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceUpdate {
    pub enabled: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitView {
    pub group: String,
    pub max: u64,
    pub window_ms: u64,
    pub unlimited: bool,
    pub current: u64,
}

async fn require_admin(
    services: &AdminServices,
    headers: &HeaderMap,
) -> Result<AdminIdentity, Rejection> {
    match services.identity.check(headers).await {
        AdminCheck::Verified(identity) => Ok(identity),
        _ => Err(Rejection::Unauthorized),
    }
}

pub async fn get_config(services: AdminServices, req: RouteRequest) -> Response {
    let (parts, _body) = req.request.into_parts();
    if let Err(rejection) = require_admin(&services, &parts.headers).await {
        return rejection.into_response();
    }

    match services.maintenance.load().await {
        Ok(maintenance) => Json(ConfigView { maintenance }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read maintenance config");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read config")
        }
    }
}

pub async fn put_config(services: AdminServices, req: RouteRequest) -> Response {
    let (parts, body) = req.request.into_parts();
    let admin = match require_admin(&services, &parts.headers).await {
        Ok(admin) => admin,
        Err(rejection) => return rejection.into_response(),
    };

    let update: MaintenanceUpdate = match read_json(body).await {
        Some(update) => update,
        None => return json_error(StatusCode::BAD_REQUEST, "Invalid request body"),
    };

    let current = match services.maintenance.load().await {
        Ok(current) => current,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read maintenance config");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read config");
        }
    };

    let next = MaintenanceConfig {
        enabled: update.enabled,
        message: update
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(current.message),
    };

    if let Err(e) = services.maintenance.store(&next).await {
        tracing::error!(error = %e, "Failed to store maintenance config");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update config");
    }

    tracing::info!(
        admin_id = admin.user_id,
        enabled = next.enabled,
        "Maintenance mode updated"
    );
    Json(ConfigView { maintenance: next }).into_response()
}

pub async fn get_rate_limit(services: AdminServices, req: RouteRequest) -> Response {
    let (parts, _body) = req.request.into_parts();
    if let Err(rejection) = require_admin(&services, &parts.headers).await {
        return rejection.into_response();
    }

    let group = req.params.get("group").unwrap_or_default();
    let policy = services.limiter.policy(group);
    let current = match services.limiter.current_count(group).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(group = %policy.group, error = %e, "Failed to read counter");
            return json_error(StatusCode::SERVICE_UNAVAILABLE, "Counter store unavailable");
        }
    };

    Json(RateLimitView {
        unlimited: policy.is_unlimited(),
        group: policy.group,
        max: policy.max,
        window_ms: policy.window_ms,
        current,
    })
    .into_response()
}

async fn read_json<T: serde::de::DeserializeOwned>(body: Body) -> Option<T> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}
