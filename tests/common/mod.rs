//! Shared utilities for the integration tests.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use classifieds_gateway::admin::token::JwtVerifier;
use classifieds_gateway::admin::users::{SqliteUserDirectory, UserRecord};
use classifieds_gateway::config::{GatewayConfig, GroupLimitConfig};
use classifieds_gateway::http::AppState;
use classifieds_gateway::lifecycle::build_state_with;
use classifieds_gateway::maintenance::{MaintenanceConfig, MaintenanceSource, SqliteMaintenanceStore};
use classifieds_gateway::routing::{RouteOptions, RouteRequest, Router};
use classifieds_gateway::HttpServer;

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_ID: i64 = 1;
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const MEMBER_ID: i64 = 2;
pub const MEMBER_EMAIL: &str = "member@example.com";

/// A gateway wired to a throwaway data directory.
#[allow(dead_code)]
pub struct TestGateway {
    pub config: GatewayConfig,
    pub state: AppState,
    pub router: axum::Router,
    // Keeps the SQLite files alive for the lifetime of the test.
    _dir: TempDir,
}

/// Config rooted in `dir`, with LISTINGS capped at `listings_max` per hour.
pub fn test_config(dir: &TempDir, listings_max: u64) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.storage.counter_dir = dir.path().join("rate").to_string_lossy().to_string();
    config.storage.database_path = dir.path().join("app.sqlite").to_string_lossy().to_string();
    config.auth.jwt_secret = SECRET.to_string();

    let mut groups = BTreeMap::new();
    groups.insert(
        "LISTINGS".to_string(),
        GroupLimitConfig {
            max: listings_max,
            window_ms: 3_600_000,
        },
    );
    config.rate_limit.groups = groups;
    config
}

fn label(name: &'static str) -> impl Fn(RouteRequest) -> std::future::Ready<axum::response::Response> {
    move |req: RouteRequest| {
        let id = req.params.get("id").map(str::to_string);
        std::future::ready(Json(json!({ "route": name, "id": id })).into_response())
    }
}

/// Application routes standing in for the marketplace controllers.
pub fn register_app_routes(router: &mut Router) -> Result<(), classifieds_gateway::routing::RouteError> {
    router
        .add("GET", "/api/listings/", label("index"), RouteOptions::rate_group("LISTINGS"))?
        .add("GET", "/api/listings/search", label("search"), RouteOptions::rate_group("LISTINGS"))?
        .add("GET", "/api/listings/:id", label("show"), RouteOptions::rate_group("LISTINGS"))?
        .add("POST", "/api/auth/otp", label("otp"), RouteOptions::rate_group("AUTH"))?
        .add("GET", "/about", label("about"), RouteOptions::default())?;
    Ok(())
}

pub fn gateway_with(dir: TempDir, config: GatewayConfig) -> TestGateway {
    let state = build_state_with(&config, register_app_routes).unwrap();

    let users = SqliteUserDirectory::new(&config.storage.database_path);
    users
        .upsert(&UserRecord {
            id: ADMIN_ID,
            email: ADMIN_EMAIL.to_string(),
            is_admin: true,
        })
        .unwrap();
    users
        .upsert(&UserRecord {
            id: MEMBER_ID,
            email: MEMBER_EMAIL.to_string(),
            is_admin: false,
        })
        .unwrap();

    let router = HttpServer::new(&config, state.clone()).router();
    TestGateway {
        config,
        state,
        router,
        _dir: dir,
    }
}

pub fn gateway(listings_max: u64) -> TestGateway {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, listings_max);
    gateway_with(dir, config)
}

#[allow(dead_code)]
pub fn token(user_id: i64, email: &str, ttl_hours: i64) -> String {
    JwtVerifier::new(SECRET).issue(user_id, email, ttl_hours).unwrap()
}

#[allow(dead_code)]
pub fn admin_token() -> String {
    token(ADMIN_ID, ADMIN_EMAIL, 1)
}

impl TestGateway {
    #[allow(dead_code)]
    pub async fn set_maintenance(&self, enabled: bool, message: &str) {
        SqliteMaintenanceStore::new(&self.config.storage.database_path)
            .store(&MaintenanceConfig {
                enabled,
                message: message.to_string(),
            })
            .await
            .unwrap();
    }

    #[allow(dead_code)]
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body.to_vec())
    }

    #[allow(dead_code)]
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None, None).await
    }

    /// Send a request and decode the body as JSON (`Null` when it is not JSON).
    #[allow(dead_code)]
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, _, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
