//! Layered configuration loading: file > environment > defaults.
//!
//! 1. Start from [`Config::default`].
//! 2. If a config file is found (explicit path, `CLASSROOM_CONFIG_FILE`, or
//!    the platform config directory via `directories`), deep-merge its TOML
//!    table over the defaults.
//! 3. Apply `CLASSROOM_*`-prefixed environment variable overrides.
//! 4. Validate; an invalid final configuration fails loading.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

const ENV_PREFIX: &str = "CLASSROOM_";
const CONFIG_FILE_ENV_VAR: &str = "CLASSROOM_CONFIG_FILE";
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Loads configuration using the full file > env > defaults precedence chain.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a discovered config file is malformed, an
/// environment override cannot be parsed, or the final configuration fails
/// validation.
pub fn load() -> ConfigResult<Config> {
    let mut value = toml::Value::try_from(Config::default())
        .expect("Config::default() always serializes to a TOML table");

    if let Some(path) = discover_config_path() {
        if let Some(overlay) = try_load_file(&path)? {
            deep_merge(&mut value, overlay);
            info!(path = %path.display(), "loaded config file");
        }
    } else {
        debug!("no config file found, using embedded defaults");
    }

    apply_env_overrides(&mut value)?;

    let config: Config = value.try_into().map_err(|e: toml::de::Error| ConfigError::ParseError {
        path: "<merged config>".to_string(),
        source: e,
    })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Loads configuration from a single file, skipping file-discovery and
/// environment overrides. Used by tests and by tools that want an explicit,
/// hermetic configuration.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_FILE_ENV_VAR) {
        return Some(PathBuf::from(explicit));
    }
    directories::ProjectDirs::from("", "", "classroom-hub")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|p| p.exists())
}

fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }
    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(value))
}

/// Recursively merges `overlay` onto `base`, overlay taking precedence.
fn deep_merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_table.insert(key, overlay_value);
                    },
                }
            }
        },
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

/// Applies `CLASSROOM_SECTION_FIELD=value` environment overrides onto the
/// merged TOML tree, e.g. `CLASSROOM_HTTP_PORT=9090` sets `http.port`.
fn apply_env_overrides(value: &mut toml::Value) -> ConfigResult<()> {
    for (var, raw) in std::env::vars() {
        let Some(rest) = var.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let Some((section, field)) = rest.to_ascii_lowercase().split_once('_') else {
            continue;
        };
        let Some(table) = value.as_table_mut() else {
            continue;
        };
        let Some(section_table) = table.get_mut(section).and_then(toml::Value::as_table_mut)
        else {
            continue;
        };
        let Some(existing) = section_table.get(field) else {
            continue;
        };
        let parsed = parse_like(existing, &raw).ok_or_else(|| ConfigError::InvalidEnvValue {
            var: var.clone(),
            value: raw.clone(),
        })?;
        section_table.insert(field.to_string(), parsed);
    }
    Ok(())
}

/// Parses `raw` into whichever TOML scalar type `existing` already has.
fn parse_like(existing: &toml::Value, raw: &str) -> Option<toml::Value> {
    match existing {
        toml::Value::Integer(_) => raw.parse::<i64>().ok().map(toml::Value::Integer),
        toml::Value::Float(_) => raw.parse::<f64>().ok().map(toml::Value::Float),
        toml::Value::Boolean(_) => raw.parse::<bool>().ok().map(toml::Value::Boolean),
        _ => Some(toml::Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_file_parses_and_validates_an_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\nport = 9090\n").unwrap();
        let config = load_file(&path).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.host, Config::default().http.host);
    }

    #[test]
    fn load_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\nport = 0\n").unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn load_file_missing_is_a_read_error() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn deep_merge_overlays_only_present_keys() {
        let mut base = toml::Value::try_from(Config::default()).unwrap();
        let overlay: toml::Value = toml::from_str("[ws]\nping_interval_secs = 5\n").unwrap();
        deep_merge(&mut base, overlay);
        let merged: Config = base.try_into().unwrap();
        assert_eq!(merged.ws.ping_interval_secs, 5);
        assert_eq!(merged.ws.outbound_buffer, Config::default().ws.outbound_buffer);
    }
}
