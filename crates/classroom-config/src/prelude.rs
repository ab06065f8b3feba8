//! Prelude module - commonly used types for convenient import.
//!
//! Use `use classroom_config::prelude::*;` to import all essential types.

pub use crate::{Config, ConfigError, ConfigResult, DbConfig, HttpConfig, LogConfig, WsConfig};
