//! Administrator identity and the admin API.

pub mod auth;
pub mod handlers;
pub mod token;
pub mod users;

use std::sync::Arc;

use crate::maintenance::MaintenanceSource;
use crate::ratelimit::RateLimiter;
use crate::routing::{RouteError, RouteOptions, Router};

use self::auth::AdminIdentityCheck;
use self::handlers::*;

pub use auth::{AdminCheck, AdminIdentity};

/// Dependencies shared by the admin handlers.
#[derive(Clone)]
pub struct AdminServices {
    pub identity: Arc<AdminIdentityCheck>,
    pub maintenance: Arc<dyn MaintenanceSource>,
    pub limiter: Arc<RateLimiter>,
}

/// Register the admin API under `prefix` (e.g. `/api/admin`), all in the ADMIN group.
pub fn register_routes(
    router: &mut Router,
    prefix: &str,
    services: AdminServices,
) -> Result<(), RouteError> {
    let prefix = prefix.trim_end_matches('/');

    let s = services.clone();
    router.add(
        "GET",
        &format!("{prefix}/config"),
        move |req| get_config(s.clone(), req),
        RouteOptions::rate_group("ADMIN"),
    )?;

    let s = services.clone();
    router.add(
        "PUT",
        &format!("{prefix}/config"),
        move |req| put_config(s.clone(), req),
        RouteOptions::rate_group("ADMIN"),
    )?;

    let s = services;
    router.add(
        "GET",
        &format!("{prefix}/rate-limits/:group"),
        move |req| get_rate_limit(s.clone(), req),
        RouteOptions::rate_group("ADMIN"),
    )?;

    Ok(())
}
