//! `bridged`: bridge daemon entry point.

use std::process::ExitCode;

use bridge_daemon::cli;
use bridge_daemon::commands;
use bridge_daemon::observability::logging;
use bridge_daemon::{CommandLifecycle, ConfigResolver, FlagValues};

#[tokio::main]
async fn main() -> ExitCode {
    let (cli, matches) = match cli::parse_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    let command = cli.command;
    let profile = command.init_profile();

    if profile.bootstraps() {
        logging::init(&cli.flags.log_format);
    }

    let flags = FlagValues::from_matches(&matches, "bridged");
    let mut lifecycle = CommandLifecycle::new(ConfigResolver::new(flags));

    let name = command.name();
    let result = lifecycle
        .run(name, profile, |context| commands::execute(command, context))
        .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_fatal() => {
            tracing::error!(command = name, error = %e, "Fatal error");
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
        Err(e) => {
            tracing::error!(command = name, error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
