//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (answer preflight, tag responses with allow-origin)
//!     → static passthrough / maintenance gate / routing
//! ```
//!
//! Rate limiting lives in `ratelimit`; it is keyed by route group and
//! only runs after a route has matched.

pub mod cors;

pub use cors::CorsPolicy;
