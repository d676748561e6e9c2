//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and middleware produce:
//!     → logging.rs (structured log events, request spans)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is recorded on every request span
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
