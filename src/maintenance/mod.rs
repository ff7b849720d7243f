//! Maintenance mode.
//!
//! # Data Flow
//! ```text
//! every request (after CORS/static passthrough)
//!     → gate.rs loads store.rs config (fresh read)
//!     → disabled: pass
//!     → enabled: allowlisted path or verified admin passes, else
//!       503 JSON (API paths) / 503 page.rs HTML (everything else)
//! ```

pub mod gate;
pub mod page;
pub mod store;

pub use gate::{AllowReason, GateDecision, MaintenanceGate};
pub use store::{MaintenanceConfig, MaintenanceSource, SqliteMaintenanceStore, DEFAULT_MESSAGE};
