//! Initialization profiles selected before a command runs.

use std::fmt;

/// How much of the bootstrap a command needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitProfile {
    /// Resolve configuration and start the metrics listener.
    Full,
    /// Touch nothing. Used by introspection commands that must return instantly.
    Skip,
}

impl InitProfile {
    /// Whether configuration is resolved and the metrics listener started.
    pub fn bootstraps(self) -> bool {
        matches!(self, InitProfile::Full)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InitProfile::Full => "full",
            InitProfile::Skip => "skip",
        }
    }
}

impl fmt::Display for InitProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_gates() {
        assert!(InitProfile::Full.bootstraps());
        assert!(!InitProfile::Skip.bootstraps());
        assert_eq!(InitProfile::Full.to_string(), "full");
    }
}
