//! Metrics HTTP server.
//!
//! # Responsibilities
//! - Create the Axum Router with the single `GET /metrics` route
//! - Wire up middleware (tracing, read/write timeouts, header limit)
//! - Serve on an already-bound listener until told to drain

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::header,
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::http::request::limit_header_size;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::metrics;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_HEADER_BYTES: usize = 1 << 20;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Listener settings for the metrics endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsServerConfig {
    pub listen_addr: SocketAddr,
    /// Bound on reading a request body.
    pub read_timeout: Duration,
    /// Bound on producing a response.
    pub write_timeout: Duration,
    pub max_header_bytes: usize,
}

impl MetricsServerConfig {
    /// Config for `listen_addr` with the default timeouts and header limit.
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
        }
    }
}

/// HTTP server exposing the process metrics.
pub struct MetricsServer {
    router: Router,
}

impl MetricsServer {
    pub fn new(config: &MetricsServerConfig) -> Self {
        // Install the recorder before the first scrape can arrive.
        let _ = metrics::prometheus_handle();

        Self {
            router: Self::build_router(config),
        }
    }

    #[allow(deprecated)]
    fn build_router(config: &MetricsServerConfig) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .layer(middleware::from_fn_with_state(
                config.max_header_bytes,
                limit_header_size,
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(config.write_timeout))
                    .layer(RequestBodyTimeoutLayer::new(config.read_timeout)),
            )
    }

    /// Serve until `shutdown` fires, then drain in-flight connections.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Metrics server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        tracing::info!(address = %addr, "Metrics server stopped");
        Ok(())
    }
}

async fn metrics_handler() -> impl IntoResponse {
    metrics::record_scrape();
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], metrics::render())
}
