//! Configuration types for the classroom messaging hub.
//!
//! Every section implements [`Default`] with production-sensible values so a
//! bare `[section]` header (or a completely absent section) in TOML still
//! produces a working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration, loaded with file > environment > defaults precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Embedded persistence store settings.
    pub db: DbConfig,
    /// HTTP listener settings.
    pub http: HttpConfig,
    /// WebSocket connection settings.
    pub ws: WsConfig,
    /// Logging/telemetry settings.
    pub log: LogConfig,
}

/// Embedded-store configuration (§6 `db.*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Filesystem path of the SurrealKV data directory.
    pub path: String,
    /// Seconds to wait for a persistence operation before timing out.
    pub timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: "./data/classroom.skv".to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP listener configuration (§6 `http.*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Seconds allowed per inbound HTTP read.
    pub read_timeout_secs: u64,
    /// Seconds allowed per outbound HTTP write.
    pub write_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            read_timeout_secs: 30,
            write_timeout_secs: 30,
        }
    }
}

/// WebSocket connection configuration (§6 `ws.*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    /// Seconds between heartbeat pings.
    pub ping_interval_secs: u64,
    /// Seconds allowed per inbound frame read before considering the peer stale.
    pub read_timeout_secs: u64,
    /// Seconds allowed per outbound frame write before timing out.
    pub write_timeout_secs: u64,
    /// Capacity of each Client Session's outbound queue.
    pub outbound_buffer: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            ping_interval_secs: 30,
            read_timeout_secs: 60,
            write_timeout_secs: 10,
            outbound_buffer: 100,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `pretty` for local development, `json` for production aggregation.
    pub format: String,
    /// `stdout` or `file`.
    pub target: String,
    /// Directory for rolling log files, used when `target = "file"`.
    pub directory: String,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: "pretty".to_string(),
            target: "stdout".to_string(),
            directory: "./logs".to_string(),
            level: "info".to_string(),
        }
    }
}
