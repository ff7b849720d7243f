//! Static asset passthrough.
//!
//! Requests under a configured prefix are served straight from disk and
//! skip maintenance, routing and rate limiting.

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::StaticFilesConfig;

#[derive(Debug, Clone)]
pub struct StaticAssets {
    service: ServeDir,
    prefixes: Vec<String>,
}

impl StaticAssets {
    pub fn from_config(config: &StaticFilesConfig) -> Option<Self> {
        if !config.enabled || config.prefixes.is_empty() {
            return None;
        }
        Some(Self {
            service: ServeDir::new(&config.root),
            prefixes: config.prefixes.clone(),
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub async fn serve(&self, request: Request<Body>) -> Response {
        match self.service.clone().oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        }
        .into_response()
    }
}
