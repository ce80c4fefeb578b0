//! Per-command bootstrap orchestration.
//!
//! ```text
//! pre_run(profile)   resolve config → start metrics listener
//! body(context)      raced against the listener's fatal signal
//! post_run()         metrics shutdown, always, bounded by the timeout
//! ```
//!
//! A failing body keeps its own error. A shutdown failure replaces a
//! successful body result.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::flags::METRICS_LISTEN_ADDR;
use crate::config::validation::parse_listen_addr;
use crate::config::{ConfigResolver, ConfigStore, NodeConfig};
use crate::error::{BootstrapError, BoxError};
use crate::http::MetricsServerConfig;
use crate::lifecycle::profile::InitProfile;
use crate::lifecycle::supervisor::{MetricsError, MetricsSupervisor};
use crate::observability::metrics;

/// Upper bound on draining the metrics listener after a command.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// What a command body receives from the bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapContext {
    pub profile: InitProfile,
    /// Resolved configuration; empty when the profile skipped resolution.
    pub store: Arc<ConfigStore>,
    pub node: Arc<NodeConfig>,
    /// Bound metrics address when the listener was started.
    pub metrics_addr: Option<SocketAddr>,
}

/// Runs a command between the bootstrap hooks.
pub struct CommandLifecycle {
    resolver: ConfigResolver,
    supervisor: MetricsSupervisor,
    store: ConfigStore,
    node: NodeConfig,
    shutdown_timeout: Duration,
}

impl CommandLifecycle {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self {
            resolver,
            supervisor: MetricsSupervisor::new(),
            store: ConfigStore::new(),
            node: NodeConfig::default(),
            shutdown_timeout: SHUTDOWN_TIMEOUT,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn supervisor(&self) -> &MetricsSupervisor {
        &self.supervisor
    }

    #[cfg(test)]
    pub(crate) fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Initialize what `profile` asks for.
    ///
    /// A missing node config file falls back to defaults; any other load
    /// failure aborts. A listener that cannot bind is fatal.
    pub fn pre_run(&mut self, profile: InitProfile) -> Result<BootstrapContext, BootstrapError> {
        let mut metrics_addr = None;

        if profile.bootstraps() {
            match self.resolver.resolve(&mut self.store) {
                Ok(node) => self.node = node,
                Err(e) if e.is_not_found() => {
                    tracing::warn!(error = %e, "Using default node configuration");
                }
                Err(e) => return Err(e.into()),
            }

            let config = self.metrics_config().map_err(BootstrapError::MetricsFatal)?;
            let addr = self.supervisor.start(&config).map_err(BootstrapError::MetricsFatal)?;
            metrics_addr = Some(addr);

            metrics::record_bootstrap(profile.as_str());
            tracing::debug!(profile = %profile, "Bootstrap complete");
        }

        Ok(BootstrapContext {
            profile,
            store: Arc::new(self.store.clone()),
            node: Arc::new(self.node.clone()),
            metrics_addr,
        })
    }

    /// Shut the metrics listener down. Safe to call when it never started.
    pub async fn post_run(&mut self) -> Result<(), BootstrapError> {
        self.supervisor
            .shutdown(self.shutdown_timeout)
            .await
            .map_err(BootstrapError::Shutdown)
    }

    /// Run `body` between the pre-run and post-run hooks.
    ///
    /// If the metrics listener dies while the body runs, the body is dropped
    /// and a fatal error is returned without running post-run.
    pub async fn run<F, Fut>(
        &mut self,
        command: &'static str,
        profile: InitProfile,
        body: F,
    ) -> Result<(), BootstrapError>
    where
        F: FnOnce(BootstrapContext) -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        let context = self.pre_run(profile)?;
        let mut fatal = self.supervisor.fatal_signal();

        let body_result = tokio::select! {
            res = body(context) => res,
            err = fatal.wait() => {
                tracing::error!(command, error = %err, "Metrics server died, aborting command");
                return Err(BootstrapError::MetricsFatal(err));
            }
        };

        if profile.bootstraps() {
            metrics::record_command(command, body_result.is_ok());
        }

        let shutdown_result = self.post_run().await;

        match body_result {
            Err(e) => {
                if let Err(shutdown_err) = shutdown_result {
                    tracing::error!(error = %shutdown_err, "Shutdown failed after command error");
                }
                Err(BootstrapError::Command(e))
            }
            Ok(()) => shutdown_result,
        }
    }

    fn metrics_config(&self) -> Result<MetricsServerConfig, MetricsError> {
        let addr = self.store.get(METRICS_LISTEN_ADDR).unwrap_or("");
        let listen_addr = parse_listen_addr(addr).map_err(|source| MetricsError::InvalidAddress {
            addr: addr.to_string(),
            source,
        })?;
        Ok(MetricsServerConfig::new(listen_addr))
    }
}
