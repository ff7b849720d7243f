//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Admission pipeline produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every response carries x-request-id; rejections log it
//! - Metrics are cheap and safe to record with no exporter installed

pub mod logging;
pub mod metrics;
