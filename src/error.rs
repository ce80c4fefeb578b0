//! Top-level error type for the bootstrap sequence.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::lifecycle::supervisor::MetricsError;

/// Boxed error returned by a subcommand body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that end a command invocation.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Node configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The metrics listener failed to bind or stopped serving.
    ///
    /// The process must terminate when this is returned.
    #[error("metrics server failed: {0}")]
    MetricsFatal(#[source] MetricsError),

    /// The metrics listener did not shut down cleanly.
    #[error("metrics server shutdown failed: {0}")]
    Shutdown(#[source] MetricsError),

    /// The subcommand body returned an error.
    #[error("{0}")]
    Command(BoxError),
}

impl BootstrapError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether this error requires immediate process termination.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BootstrapError::MetricsFatal(_))
    }
}
