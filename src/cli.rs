//! Command tree and persistent flags.

use std::ffi::OsString;

use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::lifecycle::InitProfile;

pub const DEFAULT_NODE_ENDPOINT: &str = "http://localhost:26657";
pub const DEFAULT_CHAIN_ID: &str = "1";
pub const DEFAULT_LOG_FORMAT: &str = "text";
pub const DEFAULT_METRICS_LISTEN_ADDR: &str = ":2112";
pub const DEFAULT_RPC_LISTEN_ADDR: &str = ":8646";

const HOME_DIR_NAME: &str = ".bridged";

/// `$HOME/.bridged`, or `.bridged` when no home directory is known.
pub fn default_home() -> String {
    dirs::home_dir()
        .map(|home| home.join(HOME_DIR_NAME))
        .unwrap_or_else(|| HOME_DIR_NAME.into())
        .to_string_lossy()
        .into_owned()
}

#[derive(Debug, Parser)]
#[command(name = "bridged", about = "Bridge daemon", version)]
pub struct Cli {
    #[command(flatten)]
    pub flags: BridgeFlags,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct BridgeFlags {
    /// Node to connect to
    #[arg(long, short = 'n', global = true, env = "BRIDGE_NODE_ENDPOINT", default_value = DEFAULT_NODE_ENDPOINT)]
    pub node_endpoint: String,

    /// Directory for config and data
    #[arg(long, global = true, env = "BRIDGE_HOME", default_value_t = default_home())]
    pub home_directory: String,

    /// Bridge storage path (default <home>/bridge/storage)
    #[arg(long, global = true, env = "BRIDGE_STORAGE_PATH")]
    pub bridge_storage_path: Option<String>,

    /// Bridge sqlite path (default <home>/bridge/sqlite)
    #[arg(long, global = true, env = "BRIDGE_SQLITE_PATH")]
    pub bridge_sqlite_path: Option<String>,

    /// Node config file (default <home>/config/bridge.toml)
    #[arg(long, global = true, env = "BRIDGE_NODE_CONFIG")]
    pub node_config_path: Option<String>,

    /// Chain id
    #[arg(long, global = true, env = "BRIDGE_CHAIN_ID", default_value = DEFAULT_CHAIN_ID)]
    pub chain_id: String,

    /// Log format: text or json
    #[arg(long, global = true, env = "BRIDGE_LOG_FORMAT", default_value = DEFAULT_LOG_FORMAT)]
    pub log_format: String,

    /// Metrics server listen address
    #[arg(long, global = true, env = "BRIDGE_METRICS_LISTEN_ADDR", default_value = DEFAULT_METRICS_LISTEN_ADDR)]
    pub metrics_listen_addr: String,

    /// RPC server listen address
    #[arg(long, global = true, env = "BRIDGE_RPC_LISTEN_ADDR", default_value = DEFAULT_RPC_LISTEN_ADDR)]
    pub rpc_listen_addr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Start the bridge daemon
    Start,

    /// Print the resolved configuration
    ShowConfig {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Print version information
    Version,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Start => "start",
            Commands::ShowConfig { .. } => "show-config",
            Commands::Version => "version",
        }
    }

    /// Bootstrap work this command needs before its body runs.
    pub fn init_profile(&self) -> InitProfile {
        match self {
            Commands::Start => InitProfile::Full,
            Commands::ShowConfig { .. } => InitProfile::Full,
            Commands::Version => InitProfile::Skip,
        }
    }
}

/// Parse arguments, keeping the raw matches for flag binding.
pub fn parse_from<I, T>(args: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok((cli, matches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::flags::{BRIDGE_STORAGE_PATH, HOME_DIRECTORY, METRICS_LISTEN_ADDR};
    use crate::config::FlagValues;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_profiles() {
        assert_eq!(Commands::Version.init_profile(), InitProfile::Skip);
        assert_eq!(Commands::Start.init_profile(), InitProfile::Full);
        assert_eq!(
            Commands::ShowConfig { json: false }.init_profile(),
            InitProfile::Full
        );
    }

    #[test]
    fn test_flags_after_subcommand() {
        let (cli, matches) =
            parse_from(["bridged", "start", "--home-directory", "/data", "--metrics-listen-addr", ":9100"]).unwrap();

        assert_eq!(cli.command, Commands::Start);
        assert_eq!(cli.flags.home_directory, "/data");

        let flags = FlagValues::from_matches(&matches, "test");
        assert!(flags.binding_errors().is_empty());
        assert_eq!(flags.get(HOME_DIRECTORY), "/data");
        assert_eq!(flags.get(METRICS_LISTEN_ADDR), ":9100");
        assert_eq!(flags.get(BRIDGE_STORAGE_PATH), "");
    }

    #[test]
    fn test_defaults() {
        let (cli, _) = parse_from(["bridged", "version"]).unwrap();
        assert_eq!(cli.command, Commands::Version);
        assert_eq!(cli.flags.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(cli.flags.rpc_listen_addr, DEFAULT_RPC_LISTEN_ADDR);
    }

    #[test]
    fn test_default_home_ends_with_dir_name() {
        assert!(default_home().ends_with(HOME_DIR_NAME));
    }
}
