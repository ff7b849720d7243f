//! Built-in endpoints owned by the gateway itself.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::admin::{self, AdminServices};
use crate::config::MaintenancePaths;
use crate::maintenance::MaintenanceGate;
use crate::routing::{RouteError, RouteOptions, RouteRequest, Router};

async fn health(_req: RouteRequest) -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

async fn maintenance_status(gate: Arc<MaintenanceGate>, _req: RouteRequest) -> Response {
    Json(gate.current().await).into_response()
}

/// Register health, maintenance status and the admin API.
///
/// Health and status carry no rate group so health checks are never throttled.
pub fn register_builtin_routes(
    router: &mut Router,
    paths: &MaintenancePaths,
    gate: Arc<MaintenanceGate>,
    admin: AdminServices,
) -> Result<(), RouteError> {
    router.add("GET", &paths.health_path, health, RouteOptions::default())?;

    router.add(
        "GET",
        &paths.status_path,
        move |req| maintenance_status(gate.clone(), req),
        RouteOptions::default(),
    )?;

    admin::register_routes(router, &paths.admin_prefix, admin)
}
