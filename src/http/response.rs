//! Client-facing admission responses.
//!
//! # Responsibilities
//! - Map each admission rejection to its status code and body
//! - Keep error bodies stable: front-end code matches on the `error` string
//!
//! # Design Decisions
//! - API rejections are JSON `{ "error": ... }`
//! - A maintenance block on a non-API path renders the HTML page instead

use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::maintenance::page::render_maintenance_page;
use crate::observability::metrics;

/// Why a request did not reach its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    RouteNotFound,
    RateLimitExceeded { group: String },
    MaintenanceBlocked { message: String, api: bool },
    Unauthorized,
}

/// JSON error body with the given status.
pub fn json_error(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::RouteNotFound => json_error(StatusCode::NOT_FOUND, "Not found"),
            Rejection::RateLimitExceeded { .. } => {
                json_error(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests")
            }
            Rejection::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
            Rejection::MaintenanceBlocked { message, api: true } => {
                metrics::record_maintenance_block("api");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "error": "Service under maintenance",
                        "message": message,
                    })),
                )
                    .into_response()
            }
            Rejection::MaintenanceBlocked { message, api: false } => {
                metrics::record_maintenance_block("page");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::CACHE_CONTROL, "no-store")],
                    Html(render_maintenance_page(&message)),
                )
                    .into_response()
            }
        }
    }
}
