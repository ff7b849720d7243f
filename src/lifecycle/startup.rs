//! Startup orchestration.
//!
//! Builds every admission component from a validated config, in
//! dependency order: stores, then identity, then gate, then routes.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::admin::auth::AdminIdentityCheck;
use crate::admin::token::JwtVerifier;
use crate::admin::users::SqliteUserDirectory;
use crate::admin::AdminServices;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::http::{register_builtin_routes, AppState, StaticAssets};
use crate::maintenance::{MaintenanceGate, SqliteMaintenanceStore};
use crate::ratelimit::{PolicyResolver, ProcessEnv, RateLimiter, SqliteCounterStore};
use crate::routing::{RouteError, Router};
use crate::security::CorsPolicy;

/// Open the stores and assemble the admission pipeline with only the
/// built-in endpoints.
pub fn build_state(config: &GatewayConfig) -> Result<AppState> {
    build_state_with(config, |_| Ok(()))
}

/// Like [`build_state`], then let `register` append application routes.
///
/// Built-in routes are registered first and therefore win on overlap.
pub fn build_state_with<F>(config: &GatewayConfig, register: F) -> Result<AppState>
where
    F: FnOnce(&mut Router) -> std::result::Result<(), RouteError>,
{
    let database_path = Path::new(&config.storage.database_path);
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let counters = SqliteCounterStore::open(&config.storage.counter_dir)?;
    info!(dir = %counters.dir().display(), "Rate counter store opened");
    let resolver = PolicyResolver::new(Arc::new(ProcessEnv), &config.rate_limit.groups);
    let limiter = Arc::new(
        RateLimiter::new(resolver, Arc::new(counters)).with_enabled(config.rate_limit.enabled),
    );

    let users = SqliteUserDirectory::new(database_path);
    users.ensure_schema()?;
    let maintenance_store = SqliteMaintenanceStore::new(database_path);
    maintenance_store.ensure_schema()?;
    let maintenance = Arc::new(maintenance_store);

    let identity = Arc::new(AdminIdentityCheck::new(
        Arc::new(JwtVerifier::new(config.auth.jwt_secret.clone())),
        Arc::new(users),
    ));

    let gate = Arc::new(MaintenanceGate::new(
        maintenance.clone(),
        identity.clone(),
        config.maintenance.clone(),
    ));

    let mut routes = Router::new();
    register_builtin_routes(
        &mut routes,
        &config.maintenance,
        gate.clone(),
        AdminServices {
            identity,
            maintenance,
            limiter: limiter.clone(),
        },
    )?;
    register(&mut routes)?;

    info!(
        routes = routes.routes().len(),
        database = %config.storage.database_path,
        rate_limit_enabled = config.rate_limit.enabled,
        "Admission pipeline ready"
    );

    Ok(AppState {
        routes: Arc::new(routes),
        limiter,
        gate,
        cors: Arc::new(CorsPolicy::from_config(&config.cors)),
        assets: StaticAssets::from_config(&config.static_files).map(Arc::new),
    })
}
