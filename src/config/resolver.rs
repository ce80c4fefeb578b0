//! Resolution of flag values into the configuration store.
//!
//! # Derivation Rules
//! ```text
//! bridge-storage-path  ""  → <home>/bridge/storage
//! bridge-sqlite-path   ""  → <home>/bridge/sqlite
//! node-config-path     ""  → <home>/config/bridge.toml
//! everything else          → verbatim
//! ```
//!
//! A non-empty override is always used as given. Resolution is idempotent:
//! the same flags always produce the same store.

use std::path::Path;

use crate::config::flags::{
    FlagValues, BRIDGE_SQLITE_PATH, BRIDGE_STORAGE_PATH, CHAIN_ID, HOME_DIRECTORY, LOG_FORMAT,
    METRICS_LISTEN_ADDR, NODE_CONFIG_PATH, NODE_ENDPOINT, RPC_LISTEN_ADDR,
};
use crate::config::loader::{load_node_config, ConfigError};
use crate::config::schema::NodeConfig;
use crate::config::store::ConfigStore;
use crate::config::validation::validate_store;

const VERBATIM_KEYS: [&str; 6] = [
    NODE_ENDPOINT,
    HOME_DIRECTORY,
    CHAIN_ID,
    LOG_FORMAT,
    METRICS_LISTEN_ADDR,
    RPC_LISTEN_ADDR,
];

const DERIVED_PATHS: [(&str, &[&str]); 3] = [
    (BRIDGE_STORAGE_PATH, &["bridge", "storage"]),
    (BRIDGE_SQLITE_PATH, &["bridge", "sqlite"]),
    (NODE_CONFIG_PATH, &["config", "bridge.toml"]),
];

/// Return the override if set, otherwise `home` joined with `subpath`.
pub fn derive_path(override_value: &str, home: &str, subpath: &[&str]) -> String {
    if !override_value.is_empty() {
        return override_value.to_string();
    }

    subpath
        .iter()
        .fold(Path::new(home).to_path_buf(), |path, part| path.join(part))
        .to_string_lossy()
        .into_owned()
}

/// Resolves flag values into a [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    flags: FlagValues,
}

impl ConfigResolver {
    pub fn new(flags: FlagValues) -> Self {
        Self { flags }
    }

    /// Write every resolved key into the store.
    pub fn apply(&self, store: &mut ConfigStore) {
        for key in VERBATIM_KEYS {
            store.set(key, self.flags.get(key));
        }

        let home = self.flags.get(HOME_DIRECTORY);
        for (key, subpath) in DERIVED_PATHS {
            store.set(key, derive_path(self.flags.get(key), home, subpath));
        }
    }

    /// Populate the store and load the node configuration file it points at.
    ///
    /// The store is fully written before the file is read, so it is usable
    /// even when loading fails.
    pub fn resolve(&self, store: &mut ConfigStore) -> Result<NodeConfig, ConfigError> {
        self.apply(store);

        if let Err(errors) = validate_store(store) {
            for error in errors {
                tracing::warn!(key = %error.key, "{}", error.message);
            }
        }

        tracing::debug!(
            home = store.get(HOME_DIRECTORY).unwrap_or(""),
            storage = store.get(BRIDGE_STORAGE_PATH).unwrap_or(""),
            sqlite = store.get(BRIDGE_SQLITE_PATH).unwrap_or(""),
            "Configuration resolved"
        );

        let path = store.get_path(NODE_CONFIG_PATH).unwrap_or_default();
        load_node_config(&path)
    }
}
