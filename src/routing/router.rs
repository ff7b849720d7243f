//! Route table and dispatch.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Find the first route whose method and pattern both match
//! - Consult the rate limiter for routes that declare a group
//! - Invoke the handler, or report an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan in registration order; first match wins
//! - Registering the same method/pattern twice is allowed and the later
//!   entry is unreachable

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use futures_util::future::{BoxFuture, FutureExt};
use tracing::debug;

use super::matcher::{PathParams, PathPattern, PatternError};
use crate::http::response::Rejection;
use crate::ratelimit::{normalize_group, RateLimiter};

/// Everything a handler receives.
pub struct RouteRequest {
    pub request: Request<Body>,
    pub params: PathParams,
}

/// Type-erased route handler.
pub type Handler = Arc<dyn Fn(RouteRequest) -> BoxFuture<'static, Response> + Send + Sync>;

/// Per-route options.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Rate-limit bucket shared by every route naming the same group.
    pub rate_group: Option<String>,
}

impl RouteOptions {
    pub fn rate_group(group: &str) -> Self {
        Self {
            rate_group: Some(normalize_group(group)),
        }
    }
}

/// One registered endpoint.
pub struct RouteEntry {
    pub method: Method,
    pub pattern: PathPattern,
    pub options: RouteOptions,
    handler: Handler,
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("invalid HTTP method: {0}")]
    Method(String),
}

/// Ordered route table.
#[derive(Default, Debug)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

/// Method names compare case-insensitively; `get` registers a GET route.
fn normalize_method(method: &str) -> Result<Method, RouteError> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| RouteError::Method(method.to_string()))
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a route. Order matters: earlier routes win.
    pub fn add<F, Fut>(
        &mut self,
        method: &str,
        pattern: &str,
        handler: F,
        options: RouteOptions,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let method = normalize_method(method)?;
        let pattern = PathPattern::parse(pattern)?;
        let options = RouteOptions {
            rate_group: options.rate_group.as_deref().map(normalize_group),
        };
        let handler: Handler = Arc::new(move |req| handler(req).boxed());

        self.routes.push(RouteEntry {
            method,
            pattern,
            options,
            handler,
        });
        Ok(self)
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// First route matching `method` and `path`, with bound parameters.
    pub fn find(&self, method: &Method, path: &str) -> Option<(&RouteEntry, PathParams)> {
        let method = normalize_method(method.as_str()).ok()?;
        self.routes.iter().find_map(|route| {
            if route.method != method {
                return None;
            }
            route.pattern.matches(path).map(|params| (route, params))
        })
    }

    /// Match, rate-limit and invoke the handler.
    ///
    /// The query string plays no part in matching. When the matched route
    /// declares a rate group and the limiter rejects, the handler is not run.
    pub async fn dispatch(
        &self,
        request: Request<Body>,
        limiter: &RateLimiter,
    ) -> Result<Response, Rejection> {
        let path = request.uri().path().to_string();
        let Some((route, params)) = self.find(request.method(), &path) else {
            return Err(Rejection::RouteNotFound);
        };

        if let Some(group) = &route.options.rate_group {
            let decision = limiter.check(group).await;
            if !decision.is_allowed() {
                debug!(path = %path, group = %group, "Rejected by rate limiter");
                return Err(Rejection::RateLimitExceeded {
                    group: group.clone(),
                });
            }
        }

        debug!(method = %route.method, pattern = %route.pattern, "Route matched");
        Ok((route.handler)(RouteRequest { request, params }).await)
    }
}
