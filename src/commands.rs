//! Subcommand bodies.
//!
//! Each body runs after the bootstrap for its profile has completed and
//! before the metrics listener is shut down.

use crate::cli::Commands;
use crate::config::flags::{BRIDGE_SQLITE_PATH, BRIDGE_STORAGE_PATH, CHAIN_ID, NODE_ENDPOINT};
use crate::config::ConfigStore;
use crate::error::BoxError;
use crate::lifecycle::{signals, BootstrapContext};
use crate::observability::metrics;

pub fn version_string() -> String {
    format!("bridged {}", env!("CARGO_PKG_VERSION"))
}

/// Dispatch a parsed command.
pub async fn execute(command: Commands, context: BootstrapContext) -> Result<(), BoxError> {
    match command {
        Commands::Start => start(context).await,
        Commands::ShowConfig { json } => {
            println!("{}", render_store(&context.store, json)?);
            Ok(())
        }
        Commands::Version => {
            println!("{}", version_string());
            Ok(())
        }
    }
}

/// Render the store as TOML, or pretty JSON.
pub fn render_store(store: &ConfigStore, json: bool) -> Result<String, BoxError> {
    if json {
        Ok(serde_json::to_string_pretty(store)?)
    } else {
        Ok(toml::to_string(store)?)
    }
}

async fn start(context: BootstrapContext) -> Result<(), BoxError> {
    let store = &context.store;

    for key in [BRIDGE_STORAGE_PATH, BRIDGE_SQLITE_PATH] {
        if let Some(path) = store.get_path(key) {
            tokio::fs::create_dir_all(&path).await?;
            tracing::debug!(key, path = %path.display(), "Storage directory ready");
        }
    }

    tracing::info!(
        node = store.get(NODE_ENDPOINT).unwrap_or(""),
        chain_id = store.get(CHAIN_ID).unwrap_or(""),
        metrics = ?context.metrics_addr,
        "Bridge daemon running"
    );
    let node = &context.node;
    tracing::info!(
        root_chain = %node.root_chain_rpc_url,
        child_chain = %node.child_chain_rpc_url,
        checkpoint_poll_secs = node.checkpoint_poll_interval_secs,
        syncer_poll_secs = node.syncer_poll_interval_secs,
        "Node configuration"
    );

    metrics::set_daemon_up(true);
    let signal = signals::wait_for_signal().await;
    metrics::set_daemon_up(false);

    signal?;
    tracing::info!("Bridge daemon stopping");
    Ok(())
}
