//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Content service produces:
//!     → reporter.rs (one record per fetch outcome)
//!         → logging.rs (structured log events)
//!         → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (key, source, error) rather than formatted strings
//! - Request ID flows through the HTTP trace span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod reporter;

pub use reporter::OutcomeReporter;
