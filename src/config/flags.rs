//! Binding of command-line flags to configuration keys.
//!
//! Precedence between an explicit flag, its environment variable and the
//! built-in default is decided by clap before anything here runs. This
//! module only reads the winning value out of the parsed matches.

use std::collections::BTreeMap;

use clap::ArgMatches;

pub const NODE_ENDPOINT: &str = "node-endpoint";
pub const HOME_DIRECTORY: &str = "home-directory";
pub const BRIDGE_STORAGE_PATH: &str = "bridge-storage-path";
pub const BRIDGE_SQLITE_PATH: &str = "bridge-sqlite-path";
pub const NODE_CONFIG_PATH: &str = "node-config-path";
pub const CHAIN_ID: &str = "chain-id";
pub const LOG_FORMAT: &str = "log-format";
pub const METRICS_LISTEN_ADDR: &str = "metrics-listen-addr";
pub const RPC_LISTEN_ADDR: &str = "rpc-listen-addr";

/// Configuration key paired with the clap argument id it is read from.
pub type FlagBinding = (&'static str, &'static str);

/// Every persistent flag the bootstrap binds.
pub const BRIDGE_FLAG_BINDINGS: &[FlagBinding] = &[
    (NODE_ENDPOINT, "node_endpoint"),
    (HOME_DIRECTORY, "home_directory"),
    (BRIDGE_STORAGE_PATH, "bridge_storage_path"),
    (BRIDGE_SQLITE_PATH, "bridge_sqlite_path"),
    (NODE_CONFIG_PATH, "node_config_path"),
    (CHAIN_ID, "chain_id"),
    (LOG_FORMAT, "log_format"),
    (METRICS_LISTEN_ADDR, "metrics_listen_addr"),
    (RPC_LISTEN_ADDR, "rpc_listen_addr"),
];

/// Raw flag values keyed by configuration key.
///
/// A flag that could not be read is recorded as an empty string so the
/// resolver falls back to its default derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagValues {
    values: BTreeMap<&'static str, String>,
    binding_errors: Vec<String>,
}

impl FlagValues {
    /// Read all bridge flags from parsed matches.
    ///
    /// Persistent flags are read from the invoked subcommand's matches.
    pub fn from_matches(matches: &ArgMatches, caller: &str) -> Self {
        let mut leaf = matches;
        while let Some((_, sub)) = leaf.subcommand() {
            leaf = sub;
        }
        Self::bind(leaf, BRIDGE_FLAG_BINDINGS, caller)
    }

    /// Read the given bindings from parsed matches.
    ///
    /// Binding failures are logged and never abort startup.
    pub fn bind(matches: &ArgMatches, bindings: &[FlagBinding], caller: &str) -> Self {
        let mut flags = Self::default();

        for &(key, id) in bindings {
            match matches.try_get_one::<String>(id) {
                Ok(value) => {
                    flags.values.insert(key, value.cloned().unwrap_or_default());
                }
                Err(e) => {
                    tracing::error!(caller = %caller, flag = %key, error = %e, "Failed to bind flag");
                    flags.binding_errors.push(key.to_string());
                    flags.values.insert(key, String::new());
                }
            }
        }

        flags
    }

    /// Set a value directly.
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// Current value of a flag; missing flags read as empty.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Keys whose binding failed.
    pub fn binding_errors(&self) -> &[String] {
        &self.binding_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn test_command() -> Command {
        Command::new("test")
            .arg(Arg::new("home_directory").long("home-directory"))
            .arg(
                Arg::new("port")
                    .long("port")
                    .value_parser(clap::value_parser!(u64)),
            )
    }

    #[test]
    fn test_missing_flag_reads_empty() {
        let flags = FlagValues::default();
        assert_eq!(flags.get(BRIDGE_STORAGE_PATH), "");
    }

    #[test]
    fn test_bind_reads_value() {
        let matches = test_command()
            .try_get_matches_from(["test", "--home-directory", "/data"])
            .unwrap();
        let flags = FlagValues::bind(&matches, &[(HOME_DIRECTORY, "home_directory")], "test");

        assert_eq!(flags.get(HOME_DIRECTORY), "/data");
        assert!(flags.binding_errors().is_empty());
    }

    #[test]
    fn test_absent_flag_binds_empty() {
        let matches = test_command().try_get_matches_from(["test"]).unwrap();
        let flags = FlagValues::bind(&matches, &[(HOME_DIRECTORY, "home_directory")], "test");

        assert_eq!(flags.get(HOME_DIRECTORY), "");
        assert!(flags.binding_errors().is_empty());
    }

    #[test]
    fn test_binding_error_is_lenient() {
        let matches = test_command()
            .try_get_matches_from(["test", "--port", "2112", "--home-directory", "/data"])
            .unwrap();
        let flags = FlagValues::bind(
            &matches,
            &[(METRICS_LISTEN_ADDR, "port"), (HOME_DIRECTORY, "home_directory")],
            "test",
        );

        // Typed as u64, so reading it as a string fails.
        assert_eq!(flags.binding_errors(), &[METRICS_LISTEN_ADDR.to_string()]);
        assert_eq!(flags.get(METRICS_LISTEN_ADDR), "");
        assert_eq!(flags.get(HOME_DIRECTORY), "/data");
    }
}
