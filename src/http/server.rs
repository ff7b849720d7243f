//! HTTP server setup and the admission pipeline.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Run every request through the admission stages in order
//! - Serve until the shutdown signal fires
//!
//! # Admission order
//! ```text
//! OPTIONS            → 204 preflight
//! static prefix      → file from disk
//! maintenance gate   → 503 JSON / 503 HTML when blocked
//! route match        → 404 when nothing matches
//! rate limiter       → 429 when the route's group is exhausted
//! handler
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::request::{request_id, UuidRequestId};
use super::response::Rejection;
use super::static_files::StaticAssets;
use crate::config::GatewayConfig;
use crate::maintenance::{GateDecision, MaintenanceGate};
use crate::observability::metrics;
use crate::ratelimit::RateLimiter;
use crate::routing::Router as RouteTable;
use crate::security::CorsPolicy;

/// Application state injected into the admission handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub limiter: Arc<RateLimiter>,
    pub gate: Arc<MaintenanceGate>,
    pub cors: Arc<CorsPolicy>,
    pub assets: Option<Arc<StaticAssets>>,
}

/// HTTP front door for the marketplace API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &GatewayConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(admission_handler))
            .route("/{*path}", any(admission_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for driving with `oneshot` in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn admission_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let mut response = admit(&state, request).await;
    state.cors.apply(&mut response);

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

async fn admit(state: &AppState, request: Request<Body>) -> Response {
    if CorsPolicy::is_preflight(&request) {
        return state.cors.preflight_response();
    }

    let path = request.uri().path().to_string();

    if let Some(assets) = &state.assets {
        if assets.matches(&path) {
            return assets.serve(request).await;
        }
    }

    let request_id = request_id(&request);
    let (parts, body) = request.into_parts();

    if let GateDecision::Blocked { message, api } = state.gate.evaluate(&path, &parts.headers).await {
        tracing::debug!(request_id = %request_id, path = %path, "Request blocked by maintenance");
        return Rejection::MaintenanceBlocked { message, api }.into_response();
    }

    let request = Request::from_parts(parts, body);
    match state.routes.dispatch(request, &state.limiter).await {
        Ok(response) => response,
        Err(rejection) => {
            tracing::debug!(
                request_id = %request_id,
                path = %path,
                rejection = ?rejection,
                "Request rejected"
            );
            rejection.into_response()
        }
    }
}
