//! Bridge daemon bootstrap library.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv / env
//!       │
//!       ▼
//!   ┌────────┐   ┌──────────────────────────── CommandLifecycle ───────────────────────────┐
//!   │  cli   │──▶│ InitProfile ──▶ ConfigResolver ──▶ MetricsSupervisor ──▶ body ──▶ drain │
//!   └────────┘   └──────────────────────┬──────────────────────┬───────────────────────────┘
//!                                       │                      │
//!                                       ▼                      ▼
//!                                  ConfigStore           GET /metrics
//!                               (resolved once)     (background listener)
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{ConfigResolver, ConfigStore, FlagValues};
pub use error::{BootstrapError, BoxError};
pub use lifecycle::{CommandLifecycle, InitProfile, MetricsSupervisor};
