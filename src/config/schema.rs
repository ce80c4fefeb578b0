//! Node configuration file schema.
//!
//! The file lives under the home directory and is read once per invocation.
//! All fields have defaults so a partial file is accepted.

use serde::{Deserialize, Serialize};

/// Persisted node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint of the root chain.
    pub root_chain_rpc_url: String,

    /// JSON-RPC endpoint of the child chain.
    pub child_chain_rpc_url: String,

    /// Interval between checkpoint polls, in seconds.
    pub checkpoint_poll_interval_secs: u64,

    /// Interval between chain syncer polls, in seconds.
    pub syncer_poll_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            root_chain_rpc_url: "http://localhost:8545".to_string(),
            child_chain_rpc_url: "http://localhost:9545".to_string(),
            checkpoint_poll_interval_secs: 300,
            syncer_poll_interval_secs: 60,
            log_level: "info".to_string(),
        }
    }
}
