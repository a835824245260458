//! Engine configuration.
//!
//! The canonical configuration lives in `fief-config.yaml` at the project
//! root. This module defines typed structs mirroring the YAML shape and a
//! loader with environment-variable overrides, so deployments can switch
//! the storage backend without editing the file:
//!
//! - `FIEF_BACKEND` overrides `storage.backend` (`memory` or `file`)
//! - `FIEF_STORAGE_PATH` overrides `storage.path`

use std::path::{Path, PathBuf};

use serde::Deserialize;

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

    /// An environment override named an unknown backend.
    #[error("unknown storage backend: {0} (expected \"memory\" or \"file\")")]
    UnknownBackend(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Which storage backend to construct at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Volatile in-memory store.
    #[default]
    Memory,
    /// File-backed JSON store.
    File,
}

impl core::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(ConfigError::UnknownBackend(other.to_owned())),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend selection.
    pub backend: BackendKind,
    /// Document path for the file backend; ignored by the memory backend.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            path: PathBuf::from("data/world.json"),
        }
    }
}

impl StorageConfig {
    /// Apply `FIEF_BACKEND` and `FIEF_STORAGE_PATH` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBackend`] if `FIEF_BACKEND` holds an
    /// unknown value.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(backend) = std::env::var("FIEF_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Ok(path) = std::env::var("FIEF_STORAGE_PATH") {
            self.path = PathBuf::from(path);
        }
        Ok(())
    }
}

/// Driver-loop settings, consumed by the engine binary only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Milliseconds between driver ticks.
    pub tick_interval_ms: u64,
    /// Stop after this many ticks; 0 runs unbounded.
    pub max_ticks: u64,
    /// Seed the starting state when the backend is empty.
    pub seed_on_empty: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            max_ticks: 0,
            seed_on_empty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Driver-loop settings.
    pub driver: DriverConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::UnknownBackend`] for a bad override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::UnknownBackend`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.storage.apply_env_overrides()?;
        Ok(config)
    }
}
