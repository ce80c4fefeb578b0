//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Command (command.rs):
//!     InitProfile → resolve config → start metrics → body → shutdown metrics
//!
//! Metrics supervision (supervisor.rs):
//!     bind → spawn serve loop → fatal signal on death → bounded drain
//!
//! Shutdown (shutdown.rs):
//!     trigger → serve loop stops accepting → in-flight requests drain
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → end the long-running command body
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the metrics listener, then the body
//! - Shutdown has a timeout: the drain is best-effort past the deadline
//! - Process exit is decided by the caller, never inside a background task

pub mod command;
pub mod profile;
pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use command::{BootstrapContext, CommandLifecycle, SHUTDOWN_TIMEOUT};
pub use profile::InitProfile;
pub use shutdown::{Shutdown, ShutdownSignal};
pub use supervisor::{FatalSignal, MetricsError, MetricsSupervisor, SupervisorState};
