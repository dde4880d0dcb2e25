//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers, gates, upstream clients produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape listener (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the trace span of every request
//! - Metric updates go through the `metrics` facade; with no exporter
//!   installed they are no-ops, so tests never need one

pub mod logging;
pub mod metrics;
