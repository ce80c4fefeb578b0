//! Shared utilities for integration tests.

use std::net::{SocketAddr, TcpListener};
use std::path::Path;

use bridge_daemon::config::flags::{HOME_DIRECTORY, METRICS_LISTEN_ADDR};
use bridge_daemon::{CommandLifecycle, ConfigResolver, FlagValues};

#[allow(dead_code)]
/// Hold a port open so nothing else can bind it.
pub fn occupy_port() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

#[allow(dead_code)]
/// Flags pointing at a temporary home and the given metrics address.
pub fn flags_for(home: &Path, metrics_addr: &str) -> FlagValues {
    FlagValues::default()
        .with(HOME_DIRECTORY, home.to_string_lossy().into_owned())
        .with(METRICS_LISTEN_ADDR, metrics_addr)
}

#[allow(dead_code)]
pub fn lifecycle_for(home: &Path, metrics_addr: &str) -> CommandLifecycle {
    CommandLifecycle::new(ConfigResolver::new(flags_for(home, metrics_addr)))
}
