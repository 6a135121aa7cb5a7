//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors during engine configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid engine config in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}
