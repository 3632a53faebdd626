//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured key/value logging; rejection diagnostics (offending value
//!   plus the configured allow-list) appear here, never in response bodies
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
