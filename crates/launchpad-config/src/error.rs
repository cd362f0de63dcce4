//! Error types for loading and writing configuration.

use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file could not be read.
    #[error("Failed to read config file {} from disk: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    /// The file was read but is not a JSON object.
    #[error("Failed to parse config file {} as JSON: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// `write` was called without a path on a store that has no origin.
    #[error("No path provided to write config to, and the config has no origin path")]
    NoPath,

    /// Serializing or writing the file failed.
    #[error("Failed to write config file {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// The merged data does not fit the requested type.
    #[error("Failed to deserialize config: {0}")]
    Deserialize(String),
}
