//! Error types for trueno-swarm operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or computing a swarm layout.
///
/// Every variant is reported before the collision resolver starts; a running
/// simulation never fails.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid layout or chart configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// The configuration key with the invalid value.
        key: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// A datum referenced a group the group scale does not know.
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    /// A datum produced a value that cannot be placed on the value axis.
    #[error("invalid value at row {index}: {value}")]
    InvalidValue {
        /// Input row index.
        index: usize,
        /// The offending value.
        value: f32,
    },

    /// Invalid chart dimensions.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Scale domain error (e.g., log of non-positive value).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// I/O error while reading a configuration file.
    #[cfg(feature = "config")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parsing error with line number.
    #[cfg(feature = "config")]
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[cfg(feature = "config")]
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),
}

impl Error {
    pub(crate) fn invalid_config(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig { key, message: message.into() }
    }
}
