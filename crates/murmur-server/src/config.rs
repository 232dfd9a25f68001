//! Configuration loading and typed config structures for the chat server.
//!
//! The configuration lives in `murmur-config.yaml` (or the file named by
//! `MURMUR_CONFIG`). Every field has a default, so a missing file or a
//! partial file is valid. A few environment variables override the file:
//!
//! - `PORT` overrides `server.port`
//! - `MURMUR_HOST` overrides `server.host`
//! - `MURMUR_DB_PATH` overrides `store.path`

use std::path::{Path, PathBuf};
use std::time::Duration;

use murmur_hub::{DEFAULT_HISTORY_CAPACITY, DEFAULT_SEND_TIMEOUT};
use murmur_store::{JsonFileStore, MemoryStore, MessageStore, StoreError};
use serde::Deserialize;

use crate::ws::DEFAULT_SEND_BUFFER;

/// Config file used when `MURMUR_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "murmur-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {name}: {message}")]
    InvalidEnv {
        /// The environment variable.
        name: &'static str,
        /// Why the value was refused.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MurmurConfig {
    /// Listening address.
    #[serde(default)]
    pub server: ServerConfig,

    /// Broadcast hub settings.
    #[serde(default)]
    pub hub: HubConfig,

    /// Message store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MurmurConfig {
    /// Load configuration the way the binary does.
    ///
    /// Reads `MURMUR_CONFIG` (or [`DEFAULT_CONFIG_PATH`]) if the file
    /// exists, falls back to defaults otherwise, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or an override is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("MURMUR_CONFIG")
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides looked up by variable name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `PORT` is not a valid port.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                name: "PORT",
                message: format!("{port:?}: {e}"),
            })?;
        }
        if let Some(host) = lookup("MURMUR_HOST") {
            self.server.host = host;
        }
        if let Some(path) = lookup("MURMUR_DB_PATH") {
            self.store.path = PathBuf::from(path);
        }
        Ok(())
    }
}

/// Listening address for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,
    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Broadcast hub configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HubConfig {
    /// Messages replayed to each new connection.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Frames queued per client before it is dropped as too slow.
    #[serde(default = "default_send_buffer")]
    pub send_buffer: usize,

    /// Milliseconds a single send may take before the client is dropped.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl HubConfig {
    /// [`Self::send_timeout_ms`] as a [`Duration`].
    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            send_buffer: default_send_buffer(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

/// Which message store backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Flat JSON file at [`StoreConfig::path`].
    #[default]
    JsonFile,
    /// Process memory; nothing survives a restart.
    Memory,
}

/// Message store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,
    /// File used by the `json_file` backend.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl StoreConfig {
    /// Open the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the JSON file cannot be created or parsed.
    pub async fn open(&self) -> Result<MessageStore, StoreError> {
        match self.backend {
            StoreBackend::JsonFile => Ok(JsonFileStore::open(&self.path).await?.into()),
            StoreBackend::Memory => Ok(MemoryStore::new().into()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    10000
}

const fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

const fn default_send_buffer() -> usize {
    DEFAULT_SEND_BUFFER
}

#[allow(clippy::cast_possible_truncation)]
const fn default_send_timeout_ms() -> u64 {
    DEFAULT_SEND_TIMEOUT.as_millis() as u64
}

fn default_store_path() -> PathBuf {
    PathBuf::from("db/data.json")
}

fn default_log_level() -> String {
    String::from("info")
}
