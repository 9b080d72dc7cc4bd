//! Server configuration
//!
//! Values come from defaults, then an optional TOML file named by
//! `LOGDECK_CONFIG`, then environment variables.

use crate::{MonitorError, Result};
use logdeck_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a TOML configuration file
pub const CONFIG_PATH_VAR: &str = "LOGDECK_CONFIG";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(MonitorError::Config(format!("Unknown log format: {}", other))),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Events retained before the oldest is evicted
    pub capacity: usize,
    /// Page size when a query does not pass `limit`
    pub default_limit: usize,
    /// Largest page a query may request
    pub max_limit: usize,
    pub enable_cors: bool,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
            capacity: store.capacity,
            default_limit: store.default_limit,
            max_limit: store.max_limit,
            enable_cors: true,
            log_format: LogFormat::Text,
        }
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| MonitorError::Config(format!("Invalid {}: {}", key, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MonitorError::Config(format!("Invalid {}: {}", key, other))),
    }
}

impl ServerConfig {
    /// Defaults, then the optional config file, then the process environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MonitorError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Override fields from variables resolved through `lookup`.
    ///
    /// `LOGDECK_*` names win over the bare `PORT` and `MAX_LOGS` names.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&'static str]| {
            keys.iter()
                .find_map(|key| lookup(key).map(|value| (*key, value)))
        };

        if let Some((_, host)) = first(&["LOGDECK_HOST"]) {
            self.host = host;
        }
        if let Some((key, port)) = first(&["LOGDECK_PORT", "PORT"]) {
            self.port = parse_var(key, &port)?;
        }
        if let Some((key, capacity)) = first(&["LOGDECK_MAX_LOGS", "MAX_LOGS"]) {
            self.capacity = parse_var(key, &capacity)?;
        }
        if let Some((key, limit)) = first(&["LOGDECK_DEFAULT_LIMIT"]) {
            self.default_limit = parse_var(key, &limit)?;
        }
        if let Some((key, limit)) = first(&["LOGDECK_MAX_LIMIT"]) {
            self.max_limit = parse_var(key, &limit)?;
        }
        if let Some((key, cors)) = first(&["LOGDECK_CORS"]) {
            self.enable_cors = parse_bool(key, &cors)?;
        }
        if let Some((_, format)) = first(&["LOGDECK_LOG_FORMAT"]) {
            self.log_format = format.parse()?;
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            capacity: self.capacity,
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(MonitorError::Config("host must not be empty".to_string()));
        }
        self.store_config().validate()?;
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
