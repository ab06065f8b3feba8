//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// The file that could not be read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A config file's TOML could not be parsed.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// The file that failed to parse.
        path: String,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// An environment variable override could not be parsed into its target type.
    #[error("invalid value for environment variable {var}: {value}")]
    InvalidEnvValue {
        /// The environment variable name.
        var: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// The final merged configuration failed validation.
    #[error("invalid configuration for {field}: {message}")]
    ValidationError {
        /// The offending field, dotted-path style (e.g. `http.port`).
        field: String,
        /// A human-readable explanation.
        message: String,
    },
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
