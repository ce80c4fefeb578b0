//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, text or JSON)
//!     → metrics.rs (counters and gauges in the process recorder)
//!
//! Consumers:
//!     → stderr (log aggregation; stdout is left to command output)
//!     → GET /metrics on the metrics listener (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
