#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration loading for the classroom messaging hub.
//!
//! A single [`Config`] type covers the keys enumerated in the external
//! interfaces: `db.*`, `http.*`, `ws.*`, plus `log.*` for telemetry. Loading
//! follows file > environment > defaults precedence; an invalid final value
//! fails process start rather than producing a degraded runtime.
//!
//! # Usage
//!
//! ```rust,no_run
//! use classroom_config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("listening on {}:{}", config.http.host, config.http.port);
//! ```
//!
//! # Design
//!
//! This crate has no dependencies on other internal crates; it depends only
//! on `serde`, `toml`, `thiserror`, `tracing`, and `directories`.

/// Configuration error types.
pub mod error;
/// Layered configuration loading (file > env > defaults).
pub mod loader;
/// Commonly used types for convenient import.
pub mod prelude;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::{Config, DbConfig, HttpConfig, LogConfig, WsConfig};

impl Config {
    /// Loads configuration with the full file > env > defaults precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a discovered config file is malformed, an
    /// environment override cannot be parsed, or the final configuration
    /// fails validation.
    pub fn load() -> ConfigResult<Self> {
        loader::load()
    }

    /// Loads configuration from a single file, with no file-discovery or
    /// environment-override layering. Useful for tests and for tools that
    /// want a hermetic configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
    /// fails validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
