//! shast configuration
//!
//! Parser limits and logging settings shared by everything that drives the
//! parser.
//!
//! # Configuration Loading Priority
//!
//! 1. Compiled-in defaults
//! 2. `/etc/shast/shast.yaml` (system-wide)
//! 3. `~/.config/shast/shast.yaml` (user)
//! 4. `./shast.yaml` (project-local)
//! 5. `SHAST_CONFIG=/path/to/config.yaml` (explicit, replaces 2-4)
//! 6. Environment variables (highest priority)
//!
//! Files ending in `.json` are read as JSON, anything else as YAML.
//!
//! # Example Configuration
//!
//! ```yaml
//! parser:
//!   max_nesting_depth: 64
//!   max_input_bytes: 1048576
//!
//! logging:
//!   level: info
//!   filter: "shast=debug"
//! ```

#![allow(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::{ConfigLoader, CONFIG_ENV};
pub use types::*;

/// Load configuration from default locations.
///
/// Searches for config files in order and merges them.
/// Environment variables override file values.
pub fn load() -> Result<ShastConfig, ConfigError> {
    ConfigLoader::new().load()
}

/// Load configuration from a specific file.
pub fn load_from_file(path: &str) -> Result<ShastConfig, ConfigError> {
    ConfigLoader::new().with_file(path).load()
}
