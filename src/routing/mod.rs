//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (scan routes in registration order)
//!     → matcher.rs (anchored segment match, bind :params)
//!     → rate limiter (only if the route names a group)
//!     → handler, or RouteNotFound
//!
//! Route Registration (at startup):
//!     Router::add(method, pattern, handler, options)
//!     → compile pattern
//!     → freeze behind Arc
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (registration order, no priorities)

pub mod matcher;
pub mod router;

pub use matcher::{PathParams, PathPattern, PatternError};
pub use router::{Handler, RouteEntry, RouteError, RouteOptions, RouteRequest, Router};
