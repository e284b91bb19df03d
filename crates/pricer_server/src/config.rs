//! Server configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and CLI arguments.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Host environment variable.
pub const ENV_HOST: &str = "GREEKS_SERVER_HOST";
/// Port environment variable.
pub const ENV_PORT: &str = "GREEKS_SERVER_PORT";
/// Log level environment variable.
pub const ENV_LOG_LEVEL: &str = "GREEKS_LOG_LEVEL";
/// Log format environment variable.
pub const ENV_LOG_FORMAT: &str = "GREEKS_LOG_FORMAT";
/// Worker thread count environment variable.
pub const ENV_WORKER_THREADS: &str = "GREEKS_WORKER_THREADS";
/// Cache capacity environment variable.
pub const ENV_CACHE_CAPACITY: &str = "GREEKS_CACHE_CAPACITY";
/// Request timeout environment variable.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "GREEKS_REQUEST_TIMEOUT_SECS";
/// HTTP body limit environment variable.
pub const ENV_MAX_BODY_BYTES: &str = "GREEKS_MAX_BODY_BYTES";

/// Default HTTP request body limit (16 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port 0 or unparsable port
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(String),

    /// Unknown log level name
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format name
    #[error("Invalid log format: {0}. Must be one of: text, json")]
    InvalidLogFormat(String),

    /// Numeric setting outside its range
    #[error("Invalid {field}: {value}. Must be at least 1")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Unreadable or malformed TOML file
    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Log levels supported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Surface shapes and cache traffic
    Debug,
    /// Requests and lifecycle
    #[default]
    Info,
    /// Rejected requests
    Warn,
    /// Failures only
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Log output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_level: LogLevel,
    /// Log output format
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_format: LogFormat,
    /// CPU worker threads for surface builds and evaluations
    pub worker_threads: usize,
    /// Maximum number of cached snapshot surfaces
    pub cache_capacity: usize,
    /// Per-request processing deadline in seconds
    pub request_timeout_secs: u64,
    /// Largest accepted HTTP snapshot body in bytes
    pub max_body_bytes: usize,
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = ConfigError>,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            log_level: LogLevel::Info,
            log_format: LogFormat::Text,
            worker_threads: 4,
            cache_capacity: 1024,
            request_timeout_secs: 30,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Override fields from a variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level.parse()?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format.parse()?;
        }
        if let Some(threads) = lookup(ENV_WORKER_THREADS) {
            self.worker_threads = parse_number("worker_threads", &threads)?;
        }
        if let Some(capacity) = lookup(ENV_CACHE_CAPACITY) {
            self.cache_capacity = parse_number("cache_capacity", &capacity)?;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = parse_number("request_timeout_secs", &timeout)?;
        }
        if let Some(limit) = lookup(ENV_MAX_BODY_BYTES) {
            self.max_body_bytes = parse_number("max_body_bytes", &limit)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }
        for (field, value) in [
            ("worker_threads", self.worker_threads as u64),
            ("cache_capacity", self.cache_capacity as u64),
            ("request_timeout_secs", self.request_timeout_secs),
            ("max_body_bytes", self.max_body_bytes as u64),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-request processing deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.parse()?;
        }
        if let Some(log_format) = &cli.log_format {
            self.log_format = log_format.parse()?;
        }
        if let Some(threads) = cli.worker_threads {
            self.worker_threads = threads;
        }
        if let Some(capacity) = cli.cache_capacity {
            self.cache_capacity = capacity;
        }
        if let Some(timeout) = cli.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(limit) = cli.max_body_bytes {
            self.max_body_bytes = limit;
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field,
        value: raw.to_string(),
    })
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Log format override
    pub log_format: Option<String>,
    /// Worker thread override
    pub worker_threads: Option<usize>,
    /// Cache capacity override
    pub cache_capacity: Option<usize>,
    /// Request timeout override
    pub request_timeout_secs: Option<u64>,
    /// HTTP body limit override
    pub max_body_bytes: Option<usize>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    build_config_with_env(cli, |name| std::env::var(name).ok())
}

/// [`build_config`] with an explicit environment lookup
pub fn build_config_with_env<F>(cli: &CliArgs, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if let Some(config_path) = &cli.config_file {
        ServerConfig::from_file(config_path)?
    } else {
        ServerConfig::default()
    };

    config.apply_env_from(lookup)?;
    config.merge_with_cli(cli)?;

    // Final validation
    config.validate()?;

    Ok(config)
}
