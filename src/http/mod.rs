//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (metrics-listen-addr)
//!     → server.rs (Axum setup, timeouts, graceful drain)
//!     → request.rs (header size limit)
//!     → GET /metrics (Prometheus text exposition)
//! ```

pub mod request;
pub mod server;

pub use server::{MetricsServer, MetricsServerConfig};
