//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! clap matches (flag > env > default)
//!     → flags.rs (bind to configuration keys, lenient)
//!     → resolver.rs (derive storage paths, write store)
//!     → validation.rs (semantic checks, warnings only)
//!     → ConfigStore (resolved once, read many)
//!     → loader.rs (node config file under the home directory)
//! ```
//!
//! # Design Decisions
//! - The store is an explicit value handed to components, never a global
//! - Resolution runs synchronously and performs no network I/O
//! - A bad flag binding degrades to the default instead of aborting

pub mod flags;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod validation;

pub use flags::FlagValues;
pub use loader::ConfigError;
pub use resolver::ConfigResolver;
pub use schema::NodeConfig;
pub use store::ConfigStore;
