use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating a shast configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML in config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON in config: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// A value parsed but is outside what the parser accepts.
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
