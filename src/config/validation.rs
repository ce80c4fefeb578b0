//! Semantic checks of resolved configuration.
//!
//! Returns every problem found, not just the first. Problems are reported
//! as warnings by the caller and never abort startup.

use std::fmt;
use std::net::{AddrParseError, SocketAddr};

use crate::config::flags::{METRICS_LISTEN_ADDR, NODE_ENDPOINT, RPC_LISTEN_ADDR};
use crate::config::store::ConfigStore;

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Parse a listen address. A missing host (`":2112"`) binds all interfaces.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr, AddrParseError> {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}").parse()
    } else {
        addr.parse()
    }
}

/// Validate a resolved store.
pub fn validate_store(store: &ConfigStore) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for key in [METRICS_LISTEN_ADDR, RPC_LISTEN_ADDR] {
        let value = store.get(key).unwrap_or("");
        if let Err(e) = parse_listen_addr(value) {
            errors.push(ValidationError {
                key,
                message: format!("invalid listen address '{value}': {e}"),
            });
        }
    }

    let endpoint = store.get(NODE_ENDPOINT).unwrap_or("");
    if let Err(e) = url::Url::parse(endpoint) {
        errors.push(ValidationError {
            key: NODE_ENDPOINT,
            message: format!("invalid endpoint '{endpoint}': {e}"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
