use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading the employee table from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file is missing or cannot be opened. Fatal for the session.
    #[error("data file not found: '{}'", path.display())]
    DataNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// The file exists but does not follow the expected schema.
    #[error("malformed data in '{}': {reason:#}", path.display())]
    Malformed {
        path: PathBuf,
        reason: anyhow::Error,
    },
}

impl LoadError {
    /// Whether the error means the source was absent rather than broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::DataNotFound { .. })
    }
}

/// Failure while reading or validating the TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {dimension} thresholds: {message}")]
    Thresholds {
        dimension: &'static str,
        message: String,
    },
}
