//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, admission pipeline)
//!     → static_files.rs (passthrough for upload/asset prefixes)
//!     → maintenance gate → routing → rate limiter → handler
//!     → response.rs (rejection bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod routes;
pub mod server;
pub mod static_files;

pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use response::{json_error, Rejection};
pub use routes::register_builtin_routes;
pub use server::{AppState, HttpServer};
pub use static_files::StaticAssets;
