//! Structured logging setup built on `tracing`/`tracing-subscriber`.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{TelemetryError, TelemetryResult};

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, colorized when attached to a terminal.
    #[default]
    Pretty,
    /// Newline-delimited JSON, for production log aggregation.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Default)]
pub enum LogTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// A daily-rolling file under the given directory.
    File {
        /// Directory the rolling log files are written into.
        directory: PathBuf,
    },
}

/// Logging configuration: level filter, output format, and output target.
#[derive(Debug, Clone)]
pub struct LogConfig {
    level: String,
    format: LogFormat,
    target: LogTarget,
    extra_directives: Vec<String>,
}

impl LogConfig {
    /// Builds a new config with the given base level directive (e.g. `"info"`).
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            extra_directives: Vec::new(),
        }
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the output target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Adds an extra `EnvFilter` directive (e.g. `"classroom_hub=trace"`),
    /// appended to the base level.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.extra_directives.push(directive.into());
        self
    }

    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut directive_string = self.level.clone();
        for extra in &self.extra_directives {
            directive_string.push(',');
            directive_string.push_str(extra);
        }
        EnvFilter::try_new(&directive_string)
            .map_err(|e| TelemetryError::ConfigError(e.to_string()))
    }
}

/// Builds a [`LogConfig`] from a [`classroom_config::LogConfig`]-shaped set
/// of values, matching the configuration keys enumerated in the external
/// interfaces (`log.format`, `log.target`, `log.directory`, `log.level`).
#[must_use]
pub fn config_from_parts(level: &str, format: &str, target: &str, directory: &str) -> LogConfig {
    let format = if format == "json" {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    let target = if target == "file" {
        LogTarget::File {
            directory: PathBuf::from(directory),
        }
    } else {
        LogTarget::Stdout
    };
    LogConfig::new(level).with_format(format).with_target(target)
}

/// Installs the global `tracing` subscriber from `config`.
///
/// # Errors
///
/// Returns a [`TelemetryError`] if the filter directive string is invalid,
/// the rolling-file appender cannot be created, or a subscriber has already
/// been installed for this process.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;

    match (&config.format, &config.target) {
        (LogFormat::Pretty, LogTarget::Stdout) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .try_init()
                .map_err(|e| TelemetryError::InitError(e.to_string()))?;
        },
        (LogFormat::Json, LogTarget::Stdout) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .map_err(|e| TelemetryError::InitError(e.to_string()))?;
        },
        (LogFormat::Pretty, LogTarget::File { directory }) => {
            let appender = tracing_appender::rolling::daily(directory, "classroom-hub.log");
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(appender),
                )
                .try_init()
                .map_err(|e| TelemetryError::InitError(e.to_string()))?;
        },
        (LogFormat::Json, LogTarget::File { directory }) => {
            let appender = tracing_appender::rolling::daily(directory, "classroom-hub.log");
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(appender))
                .try_init()
                .map_err(|e| TelemetryError::InitError(e.to_string()))?;
        },
    }
    Ok(())
}

/// Installs a default, `info`-level, pretty-to-stdout subscriber.
///
/// Convenient for tests and examples; production binaries should build a
/// [`LogConfig`] from loaded configuration instead.
///
/// # Errors
///
/// Returns a [`TelemetryError`] under the same conditions as [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_directives() {
        let config = LogConfig::new("info").with_directive("classroom_hub=debug");
        let filter = config.env_filter().unwrap();
        assert!(format!("{filter}").contains("classroom_hub=debug"));
    }

    #[test]
    fn config_from_parts_maps_unknown_format_to_pretty() {
        let config = config_from_parts("info", "weird", "stdout", "./logs");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn invalid_directive_is_a_config_error() {
        let config = LogConfig::new("not a valid directive!!");
        assert!(matches!(
            config.env_filter(),
            Err(TelemetryError::ConfigError(_))
        ));
    }
}
