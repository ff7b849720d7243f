//! Classifieds Gateway Library
//!
//! Request admission for the classifieds marketplace API: route matching,
//! group-scoped rate limiting and the maintenance gate, in front of the
//! application handlers.

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod maintenance;
pub mod observability;
pub mod ratelimit;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
