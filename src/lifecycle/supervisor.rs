//! Supervision of the background metrics listener.
//!
//! # State Machine
//! ```text
//! Idle ──start()──▶ Starting ──spawned──▶ Running ──shutdown()──▶ ShuttingDown ──▶ Stopped
//!   │                   │
//!   │                   └── bind failure ──▶ Stopped (error returned to caller)
//!   └──────────── shutdown() is a no-op ───────────────────────────────────────────────┘
//! ```
//!
//! `start()` binds synchronously and returns as soon as the serve loop is
//! spawned. If the serve loop later ends for any reason other than a
//! requested shutdown (error, panic, abort), the failure is delivered through
//! a [`FatalSignal`]; the supervisor never exits the process itself.

use std::future::pending;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::http::{MetricsServer, MetricsServerConfig};
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};

/// Errors raised by the metrics listener.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics server already started")]
    AlreadyStarted,

    #[error("serve loop terminated: {0}")]
    Serve(String),

    #[error("graceful drain did not finish within {0:?}")]
    DrainTimeout(Duration),

    #[error("server task failed: {0}")]
    Task(String),
}

/// Lifecycle state of the supervised listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

/// One-shot notification that the listener died after launch.
pub struct FatalSignal {
    rx: Option<oneshot::Receiver<MetricsError>>,
    stopping: ShutdownSignal,
}

impl FatalSignal {
    /// Resolve with the terminal error. Pends forever if the listener was
    /// never started or stopped cleanly.
    pub async fn wait(&mut self) -> MetricsError {
        if let Some(rx) = self.rx.as_mut() {
            let received = rx.await;
            self.rx = None;
            match received {
                Ok(err) => return err,
                // Sender dropped without a requested shutdown: the serve task
                // panicked, was aborted, or returned early.
                Err(_) if !self.stopping.is_triggered() => {
                    return MetricsError::Task("serve loop exited unexpectedly".to_string());
                }
                Err(_) => {}
            }
        }
        pending().await
    }
}

/// Owns the metrics listener for one process invocation.
pub struct MetricsSupervisor {
    state: SupervisorState,
    shutdown: Shutdown,
    task: Option<JoinHandle<()>>,
    fatal_rx: Option<oneshot::Receiver<MetricsError>>,
    local_addr: Option<SocketAddr>,
}

impl MetricsSupervisor {
    pub fn new() -> Self {
        Self {
            state: SupervisorState::Idle,
            shutdown: Shutdown::new(),
            task: None,
            fatal_rx: None,
            local_addr: None,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Address the listener is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the listener and spawn its serve loop without waiting on it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, config: &MetricsServerConfig) -> Result<SocketAddr, MetricsError> {
        if self.state != SupervisorState::Idle {
            return Err(MetricsError::AlreadyStarted);
        }
        self.state = SupervisorState::Starting;

        let listener = match bind(config.listen_addr) {
            Ok(listener) => listener,
            Err(e) => {
                self.state = SupervisorState::Stopped;
                tracing::error!(error = %e, "Failed to start metrics server");
                return Err(e);
            }
        };
        let local_addr = listener.local_addr().unwrap_or(config.listen_addr);

        let server = MetricsServer::new(config);
        let signal = self.shutdown.subscribe();
        let (fatal_tx, fatal_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            if let Err(e) = server.run(listener, signal).await {
                tracing::error!(error = %e, "Metrics server failed");
                let _ = fatal_tx.send(MetricsError::Serve(e.to_string()));
            }
        });

        self.task = Some(task);
        self.fatal_rx = Some(fatal_rx);
        self.local_addr = Some(local_addr);
        self.state = SupervisorState::Running;

        tracing::info!(address = %local_addr, "Metrics server launched");
        Ok(local_addr)
    }

    /// Take the fatal signal. Later calls get a signal that never fires.
    pub fn fatal_signal(&mut self) -> FatalSignal {
        FatalSignal {
            rx: self.fatal_rx.take(),
            stopping: self.shutdown.subscribe(),
        }
    }

    /// Stop accepting, drain connections for up to `timeout`, then stop.
    ///
    /// A no-op on a supervisor that never started or already stopped.
    pub async fn shutdown(&mut self, timeout: Duration) -> Result<(), MetricsError> {
        match self.state {
            SupervisorState::Idle | SupervisorState::Stopped => return Ok(()),
            _ => {}
        }

        self.state = SupervisorState::ShuttingDown;
        self.shutdown.trigger();

        let result = match self.task.take() {
            Some(mut task) => match tokio::time::timeout(timeout, &mut task).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(MetricsError::Task(e.to_string())),
                Err(_) => {
                    task.abort();
                    Err(MetricsError::DrainTimeout(timeout))
                }
            },
            None => Ok(()),
        };

        self.state = SupervisorState::Stopped;
        match &result {
            Ok(()) => tracing::info!("Metrics server shut down"),
            Err(e) => tracing::warn!(error = %e, "Metrics server shutdown incomplete"),
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn inject_fatal(&mut self) -> oneshot::Sender<MetricsError> {
        let (tx, rx) = oneshot::channel();
        self.fatal_rx = Some(rx);
        tx
    }
}

impl Default for MetricsSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a connection that sends a partial request head and never finishes it,
/// keeping the server from draining.
#[cfg(test)]
pub(crate) fn stall_connection(addr: SocketAddr) -> std::net::TcpStream {
    use std::io::Write;

    let mut stream = std::net::TcpStream::connect(addr).unwrap();
    stream
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nX-Pending: ")
        .unwrap();
    stream
}

fn bind(addr: SocketAddr) -> Result<TcpListener, MetricsError> {
    let to_bind_error = |source| MetricsError::Bind { addr, source };

    let listener = std::net::TcpListener::bind(addr).map_err(to_bind_error)?;
    listener.set_nonblocking(true).map_err(to_bind_error)?;
    TcpListener::from_std(listener).map_err(to_bind_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> MetricsServerConfig {
        MetricsServerConfig::new("127.0.0.1:0".parse().unwrap())
    }

    #[tokio::test]
    async fn test_shutdown_idle_is_noop() {
        let mut supervisor = MetricsSupervisor::new();

        assert!(supervisor.shutdown(Duration::from_secs(10)).await.is_ok());
        assert!(supervisor.shutdown(Duration::from_secs(10)).await.is_ok());
        assert_eq!(supervisor.state(), SupervisorState::Idle);
    }

    #[tokio::test]
    async fn test_start_then_shutdown() {
        let mut supervisor = MetricsSupervisor::new();
        let addr = supervisor.start(&local_config()).unwrap();

        assert_ne!(addr.port(), 0);
        assert_eq!(supervisor.state(), SupervisorState::Running);

        supervisor.shutdown(Duration::from_secs(10)).await.unwrap();
        assert_eq!(supervisor.state(), SupervisorState::Stopped);

        // Second call is a no-op.
        supervisor.shutdown(Duration::from_secs(10)).await.unwrap();

        // The port is released.
        assert!(std::net::TcpListener::bind(addr).is_ok());
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = occupied.local_addr().unwrap();

        let mut supervisor = MetricsSupervisor::new();
        let err = supervisor.start(&MetricsServerConfig::new(addr)).unwrap_err();

        assert!(matches!(err, MetricsError::Bind { .. }));
        assert_eq!(supervisor.state(), SupervisorState::Stopped);
        assert!(supervisor.shutdown(Duration::from_secs(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_start_twice_rejected() {
        let mut supervisor = MetricsSupervisor::new();
        supervisor.start(&local_config()).unwrap();

        let err = supervisor.start(&local_config()).unwrap_err();
        assert!(matches!(err, MetricsError::AlreadyStarted));

        supervisor.shutdown(Duration::from_secs(10)).await.unwrap();
    }

    #[tokio::test]
    async fn test_fatal_signal_pends_after_clean_stop() {
        let mut supervisor = MetricsSupervisor::new();
        supervisor.start(&local_config()).unwrap();
        let mut fatal = supervisor.fatal_signal();

        supervisor.shutdown(Duration::from_secs(10)).await.unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(50), fatal.wait()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_fatal_signal_delivers_error() {
        let mut supervisor = MetricsSupervisor::new();
        let tx = supervisor.inject_fatal();
        let mut fatal = supervisor.fatal_signal();

        tx.send(MetricsError::Serve("listener closed".into())).unwrap();
        let err = fatal.wait().await;
        assert!(err.to_string().contains("listener closed"));
    }

    #[tokio::test]
    async fn test_aborted_serve_task_is_fatal() {
        let mut supervisor = MetricsSupervisor::new();
        supervisor.start(&local_config()).unwrap();
        let mut fatal = supervisor.fatal_signal();

        supervisor.task.as_ref().unwrap().abort();

        let err = tokio::time::timeout(Duration::from_secs(1), fatal.wait())
            .await
            .expect("an aborted serve loop should raise the fatal signal");
        assert!(matches!(err, MetricsError::Task(_)));
    }

    #[tokio::test]
    async fn test_drain_timeout_aborts_serve_task() {
        let mut supervisor = MetricsSupervisor::new();
        let addr = supervisor.start(&local_config()).unwrap();
        let mut fatal = supervisor.fatal_signal();

        let _stalled = stall_connection(addr);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = supervisor.shutdown(Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, MetricsError::DrainTimeout(_)));
        assert_eq!(supervisor.state(), SupervisorState::Stopped);

        // The abort happened after shutdown was requested, so it is not fatal.
        let waited = tokio::time::timeout(Duration::from_millis(50), fatal.wait()).await;
        assert!(waited.is_err());
    }
}
