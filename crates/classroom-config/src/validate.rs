//! Validation rules applied to a fully merged [`crate::types::Config`].
//!
//! Invalid values fail process start rather than producing a degraded
//! runtime.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validates a merged configuration, returning the first violation found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.http.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "http.port".to_string(),
            message: "must be nonzero".to_string(),
        });
    }
    if config.http.host.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "http.host".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.db.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "db.path".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.db.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "db.timeout_secs".to_string(),
            message: "must be nonzero".to_string(),
        });
    }
    if config.ws.outbound_buffer == 0 {
        return Err(ConfigError::ValidationError {
            field: "ws.outbound_buffer".to_string(),
            message: "must be nonzero".to_string(),
        });
    }
    if config.ws.ping_interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "ws.ping_interval_secs".to_string(),
            message: "must be nonzero".to_string(),
        });
    }
    match config.log.format.as_str() {
        "pretty" | "json" => {},
        other => {
            return Err(ConfigError::ValidationError {
                field: "log.format".to_string(),
                message: format!("unknown format {other:?}, expected pretty or json"),
            });
        },
    }
    match config.log.target.as_str() {
        "stdout" | "file" => {},
        other => {
            return Err(ConfigError::ValidationError {
                field: "log.target".to_string(),
                message: format!("unknown target {other:?}, expected stdout or file"),
            });
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut cfg = Config::default();
        cfg.http.port = 0;
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let mut cfg = Config::default();
        cfg.log.format = "xml".to_string();
        assert!(validate(&cfg).is_err());
    }
}
